use comfy_table::{Cell, Color, Table, modifiers, presets};
use rust_decimal::Decimal;

use crate::{
    mode::Mode,
    plan::Plan,
    quantity::money::Gbp,
};

/// Render an annotated plan as a diagnostic table.
///
/// Purely informational; nothing in the planner consumes the output.
#[must_use]
pub fn render_plan(plan: &Plan) -> Table {
    let average_price = if plan.segments.is_empty() {
        Decimal::ZERO
    } else {
        plan.segments.iter().map(|row| row.grid_price.0).sum::<Decimal>()
            / Decimal::from(plan.segments.len())
    };

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.set_header(vec![
        "Time",
        "Price\n£/kWh",
        "Solar\nkWh",
        "Load\nkWh",
        "Mode",
        "Before\nkWh",
        "After\nkWh",
        "Grid\nkWh",
        "Wasted\nkWh",
        "Cost\n£",
    ]);
    for row in &plan.segments {
        table.add_row(vec![
            Cell::new(row.segment.to_string()),
            Cell::new(format!("{:.2}", row.grid_price.0)).fg(if row.grid_price.0 >= average_price {
                Color::Red
            } else {
                Color::Green
            }),
            Cell::new(format!("{:.2}", row.expected_solar.0)),
            Cell::new(format!("{:.2}", row.expected_load.0)),
            Cell::new(row.mode.to_string()).fg(match row.mode {
                Mode::Discharge => Color::Red,
                Mode::ChargeSolarOnly => Color::DarkYellow,
                Mode::ChargeFromGridAndSolar => Color::Green,
            }),
            Cell::new(format!("{:.2}", row.start_soc.0)),
            Cell::new(format!("{:.2}", row.end_soc.0)),
            Cell::new(format!("{:.2}", row.actual_grid_usage.0)),
            Cell::new(format!("{:.2}", row.wasted_solar.0)),
            Cell::new(format!("{:.2}", row.cost().0)).fg(if row.cost() > Gbp::ZERO {
                Color::Red
            } else {
                Color::Green
            }),
        ]);
    }
    table
}
