use anyhow::{bail, Result};
use clap::ArgMatches;

use crate::core::system_monitor::CoreTopology;
use crate::platform::{CounterSource, SystemCounters};
use crate::ui::print_topology;

/// Print the efficiency/performance split for the local or a given core count
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let cores = match matches.get_one::<usize>("cores") {
        Some(&cores) => cores,
        None => SystemCounters::new().active_core_count(),
    };

    if cores == 0 {
        bail!("Could not determine the number of active cores");
    }

    print_topology(&CoreTopology::classify(cores));
    Ok(())
}
