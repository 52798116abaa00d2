use ghostflock::app::{self, Options};

fn main() {
    env_logger::init();
    log::info!("ghostflock starting up");

    let opts = match Options::parse(std::env::args().skip(1)) {
        Ok(opts) => opts,
        Err(e) => {
            log::error!("{e}");
            eprintln!("usage: ghostflock [--config <json>] [--seed <n>] [--ghosts <n>] [--ticks <n>] [--depth sim|off|<file>]");
            std::process::exit(2);
        }
    };

    if let Err(e) = app::run(opts) {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
