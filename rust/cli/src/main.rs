use holdem_cli::logging::init_logging;

fn main() {
    init_logging();
    let code = holdem_cli::run(
        std::env::args(),
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    );
    std::process::exit(code);
}
