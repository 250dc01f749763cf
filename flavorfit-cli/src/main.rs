//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use flavorfit_cli::CliError;

#[expect(
    clippy::print_stderr,
    reason = "the binary reports fatal errors on stderr"
)]
fn main() {
    match flavorfit_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("flavorfit: {err}");
            std::process::exit(1);
        }
    }
}
