//! `regions` command: print the world registry.

use std::io::Write;

use meteorfall_core::{Region, RegionRegistry};

use crate::CliError;

pub(crate) fn write_regions(writer: &mut dyn Write) -> Result<(), CliError> {
    for region in RegionRegistry::world() {
        writeln!(writer, "{}", format_region(region)).map_err(CliError::WriteOutput)?;
    }
    Ok(())
}

fn format_region(region: &Region) -> String {
    let bounds = region.bounds();
    let (min, max) = (bounds.min(), bounds.max());
    format!(
        "{:<18} lon {:>7.1} .. {:>6.1}  lat {:>6.1} .. {:>5.1}",
        region.id().as_str(),
        min.x,
        max.x,
        min.y,
        max.y
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn lists_every_world_region_in_order() {
        let mut out = Vec::new();
        write_regions(&mut out).expect("write regions");
        let text = String::from_utf8(out).expect("utf-8 output");
        let ids: Vec<&str> = text
            .lines()
            .filter_map(|line| line.split_whitespace().next())
            .collect();
        assert_eq!(
            ids,
            [
                "Africa_MiddleEast",
                "Europe",
                "Upper_Asia",
                "Lower_Asia",
                "Australia",
                "North_America",
                "South_America",
            ]
        );
    }

    #[rstest]
    fn formats_bounds_as_longitude_then_latitude() {
        let europe = RegionRegistry::world().get("Europe").expect("Europe registered");
        let line = format_region(europe);
        assert!(line.contains("lon   -24.1 ..   32.0"), "{line}");
        assert!(line.contains("lat   36.0 ..  71.1"), "{line}");
    }
}
