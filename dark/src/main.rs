use clap::Parser;

mod app;
mod args;
mod pacer;
mod shader_source;
mod texture;

use app::App;
use args::Args;

fn main() {
    let args = <Args as Parser>::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = match App::new(&args) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Could not start renderer: {e}");
            std::process::exit(-1);
        }
    };

    app.run();
}
