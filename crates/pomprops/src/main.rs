use pomprops::execute;
use pomprops::status::BuildResultString;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    let start = Instant::now();
    let res = execute();
    let status = BuildResultString::new(res.is_ok(), start.elapsed());
    println!("{}", status);
    match res {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}
