use std::{env, fs, io};

use log::{info, warn};

use machine_learning::{config::Config, report::LogSink, training::TrainerBuilder};

fn main() -> io::Result<()> {
    env_logger::init();

    let path = env::args()
        .nth(1)
        .or_else(|| env::var("CONFIG").ok())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "usage: trainer <config.json>, or set CONFIG",
            )
        })?;

    info!("loading config from {path}");
    let config = Config::from_json(&fs::read_to_string(&path)?)?;

    let mut trainer = TrainerBuilder::new().build(&config)?;
    let stats = match trainer.train(&mut LogSink) {
        Ok(stats) => stats,
        Err(e) => {
            warn!("training stopped: {e}");
            return Err(e.into());
        }
    };

    if let Some(last) = stats.last() {
        let json = serde_json::to_string(last).map_err(io::Error::other)?;
        info!("last epoch {json}");
    }

    let eval = trainer.evaluate()?;
    info!(
        loss = eval.loss,
        accuracy = eval.accuracy.unwrap_or(f64::NAN);
        "evaluation"
    );

    for (_, name, value) in trainer.params().iter() {
        info!("{name} = {value}");
    }

    Ok(())
}
