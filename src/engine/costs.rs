//per-side transaction cost in basis points
pub fn apply_cost(value: f64, cost_bps: f64) -> f64 {
    let cost_rate = cost_bps / 10_000.0;
    value * (1.0 - cost_rate)
}

//switching assets pays one sell side and one buy side
pub fn apply_switch_cost(value: f64, cost_bps: f64) -> f64 {
    apply_cost(apply_cost(value, cost_bps), cost_bps)
}
