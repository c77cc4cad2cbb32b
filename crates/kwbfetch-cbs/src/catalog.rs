//! Static catalog of KWB dataset identifiers and measure shortcuts
//!
//! CBS publishes one Kerncijfers Wijken en Buurten table per year; the
//! 2013+ tables share a consistent OData v4 structure. The table below
//! mirrors the published series.

/// Default OData v4 base URL for the CBS dataset service
pub const ODATA_BASE: &str = "https://datasets.cbs.nl/odata/v1/CBS";

/// KWB table identifiers by year, ascending
const KWB_TABLES: &[(u16, &str)] = &[
    (2013, "82339NED"),
    (2014, "82931NED"),
    (2015, "83220NED"),
    (2016, "83487NED"),
    (2017, "83765NED"),
    (2018, "84286NED"),
    (2019, "84583NED"),
    (2020, "84799NED"),
    (2021, "85039NED"),
    (2022, "85318NED"),
    (2023, "85618NED"),
    (2024, "85984NED"),
    (2025, "86165NED"),
];

/// Shortcut names for commonly requested measure codes
const MEASURE_SHORTCUTS: &[(&str, &str)] = &[
    // Gemiddelde WOZ-waarde van woningen
    ("woz", "M001642"),
    // Koopwoningen (owner-occupied)
    ("koopwoningen", "1014800_1"),
    // Huurwoningen totaal
    ("huurwoningen", "1014850_2"),
    // Woningvoorraad (housing stock)
    ("woningvoorraad", "M000297"),
];

/// Dataset identifier for a year, if the year is in the catalog.
pub fn dataset_for(year: u16) -> Option<&'static str> {
    KWB_TABLES
        .iter()
        .find(|(y, _)| *y == year)
        .map(|(_, id)| *id)
}

/// All catalog years in ascending order.
pub fn years() -> impl Iterator<Item = u16> {
    KWB_TABLES.iter().map(|(y, _)| *y)
}

/// All catalog entries (year, dataset id) in ascending year order.
pub fn entries() -> impl Iterator<Item = (u16, &'static str)> {
    KWB_TABLES.iter().copied()
}

/// Resolve a measure token to its code.
///
/// Known shortcut names map to their measure code; anything else is
/// passed through unchanged as a literal code. Total function, never
/// an error.
pub fn resolve_measure(token: &str) -> &str {
    MEASURE_SHORTCUTS
        .iter()
        .find(|(name, _)| *name == token)
        .map_or(token, |(_, code)| *code)
}

/// Shortcut names, for the CLI help text.
pub fn shortcut_names() -> impl Iterator<Item = &'static str> {
    MEASURE_SHORTCUTS.iter().map(|(name, _)| *name)
}
