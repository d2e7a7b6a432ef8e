use clap::Parser;
use droidconf::cli::Cli;
use droidconf::output::print_error;

fn main() {
    let cli = Cli::parse();
    droidconf::init_tracing(&cli);

    if let Err(err) = droidconf::run(&cli) {
        print_error(&format!("{err:#}"));
        std::process::exit(droidconf::exit_code(&err));
    }
}
