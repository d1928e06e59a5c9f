use std::env;
use std::path::PathBuf;
use watersupply::{WaterSupplyData, WaterSupplyError};

fn main() -> Result<(), WaterSupplyError> {
    env_logger::init();
    let data = WaterSupplyData::new();

    // 20 miles instead of the default 40
    let mapping = data
        .select_stations()
        .buffer_meters(20.0 * 1609.344)
        .call()?;
    for site in data.sites().metadata()?.iter() {
        println!(
            "{}: {} stations",
            site.site_id,
            mapping.station_ids_for_site(&site.site_id).len()
        );
    }

    let output = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| data.data_root().snotel_mapping_file());
    mapping.write_csv(&output)?;
    Ok(())
}
