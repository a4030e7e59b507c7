use std::error::Error;
use vpc_topology::build_stack;
use vpc_topology::config::StackConfig;
use vpc_topology::discover_zones;
use vpc_topology::engine::RecordingEngine;
use vpc_topology::output::{print_plan_summary, print_topology, write_plan};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file("log4rs.yml", Default::default())
        .map_err(|e| format!("Error initializing log4rs: {e}"))?;
    dotenv::dotenv().ok();
    log::info!("#Start main()");

    let config = StackConfig::from_env()?;
    let zones = discover_zones(&config, None)?;

    let mut engine = RecordingEngine::new(&config.region, zones);
    let topologies = build_stack(&mut engine, &config).await?;
    for topology in &topologies {
        print_topology(topology);
    }

    let plan = engine.plan(&chrono::Utc::now().to_rfc3339())?;
    print_plan_summary(&plan);
    let path = write_plan(&plan, &config.plan_dir)?;
    log::info!("#End main() plan written to {}", path.display());

    Ok(())
}
