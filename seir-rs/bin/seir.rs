use log::*;
use seir::{
    models::Compartment, params::SEIRConfig, prelude::Real, sim::compute_many, Result,
    Simulation, SolverOptions,
};
use serde::Deserialize;
use std::{env, fs, process};

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    verbose: bool,
    output: String,
    params: SEIRConfig,
    solver: SolverOptions,
    sweep_r0: Option<Vec<Real>>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            verbose: true,
            output: "seir".into(),
            params: SEIRConfig::default(),
            solver: SolverOptions::default(),
            sweep_r0: None,
        }
    }
}

impl Config {
    pub fn write_data(&self, data: String, ext: &str) -> Result<()> {
        let name = format!("{}.{}", self.output, ext);
        fs::write(&name, data)?;
        info!("wrote {}", name);
        Ok(())
    }
}

pub fn main() {
    use simple_logger::SimpleLogger;
    if let Err(err) = SimpleLogger::new().init() {
        eprintln!("could not initialize logger: {}", err);
    }

    let path = env::args().nth(1).unwrap_or_else(|| "conf.toml".into());
    if let Err(err) = run(&path) {
        error!("{}", err);
        process::exit(1);
    }
}

fn run(path: &str) -> Result<()> {
    let cfg: Config = match fs::read_to_string(path) {
        Ok(data) => toml::from_str(&data)?,
        Err(err) => {
            warn!("could not read {} ({}), using defaults", path, err);
            Config::default()
        }
    };

    let sim = Simulation::from_config(&cfg.params)?.with_solver(cfg.solver);
    if cfg.verbose {
        println!("{}", sim.params());
    }

    let out = sim.compute()?;
    cfg.write_data(out.render_csv(','), "csv")?;
    cfg.write_data(serde_json::to_string_pretty(&out)?, "json")?;

    if let Some(values) = &cfg.sweep_r0 {
        sweep(&cfg, values)?;
    }
    Ok(())
}

/// Run one simulation per R0 value and print a summary table.
fn sweep(cfg: &Config, values: &[Real]) -> Result<()> {
    let params = values
        .iter()
        .map(|&r0| {
            let mut params = cfg.params;
            params.set_r0(r0);
            params.build()
        })
        .collect::<Result<Vec<_>>>()?;

    println!("r0,peak_day,peak_infectious,fatal,recovered");
    for (r0, res) in values.iter().zip(compute_many(&params, &cfg.solver)) {
        let out = res?;
        let (day, peak) = out.peak(Compartment::Infectious).unwrap_or((0.0, 0.0));
        println!(
            "{},{},{:.0},{:.0},{:.0}",
            r0,
            day,
            peak,
            out.final_fatal(),
            out.final_recovered()
        );
    }
    Ok(())
}
