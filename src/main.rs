use std::io::Write;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::init();

    let mut out = std::io::stdout().lock();
    let written = smilescanon::cli::run(std::env::args_os(), &mut out);
    if let Err(e) = written.and_then(|()| out.flush()) {
        log::debug!("could not write output: {e}");
    }
    ExitCode::SUCCESS
}
