use std::env;
use watersupply::{DataSource, OutlookVariable, WaterSupplyData, WaterSupplyError};

fn main() -> Result<(), WaterSupplyError> {
    env_logger::init();
    configure_polars_display();

    let data = WaterSupplyData::new();
    let issue_date = "2021-03-15";
    let site_id = "animas_r_at_durango";

    let oni = data.read_oni_data(issue_date, None)?;
    println!("ONI as of {issue_date}:\n{}", oni.tail(Some(4)));

    let outlooks = data
        .read_cpc_outlooks_precip(issue_date, Some(site_id))?;
    println!("CPC precipitation outlooks for {site_id}:\n{outlooks}");

    for source in [
        DataSource::Pdo,
        DataSource::cpc_outlooks(OutlookVariable::Temperature),
        DataSource::UsgsStreamflow,
        DataSource::Snotel,
    ] {
        let frame = data.read(source, issue_date, Some(site_id))?;
        println!("{source}: {} rows x {} columns", frame.height(), frame.width());
    }
    Ok(())
}

fn configure_polars_display() {
    // show every column
    env::set_var("POLARS_FMT_MAX_COLS", "-1");
    // show 20 rows
    env::set_var("POLARS_FMT_MAX_ROWS", "20");
}
