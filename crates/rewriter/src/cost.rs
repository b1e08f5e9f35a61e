/// Per-1K-token cost in USD. Unrecognized models fall back to the
/// `gpt-4-turbo` row -- including `claude-3-sonnet-20240229` (the default
/// Anthropic model name), which never matches the bare `claude-3-sonnet`
/// key and so silently prices at the GPT-4 Turbo rate. Left as-is rather
/// than patched: widening the key match would be a silent pricing change
/// for anyone already depending on it.
fn cost_row(model: &str) -> (f64, f64) {
    match model {
        "gpt-4-turbo" => (0.01, 0.03),
        "gpt-4" => (0.03, 0.06),
        "gpt-3.5-turbo" => (0.0005, 0.0015),
        "claude-3-opus" => (0.015, 0.075),
        "claude-3-sonnet" => (0.003, 0.015),
        "local" => (0.0, 0.0),
        _ => (0.01, 0.03), // gpt-4-turbo row
    }
}

/// Estimated USD cost for `tokens_used` tokens against `model`, assuming a
/// 60/40 input/output split.
pub fn estimate_cost(model: &str, tokens_used: usize) -> f64 {
    let (input_rate, output_rate) = cost_row(model);
    let input_tokens = (tokens_used as f64 * 0.6) as usize;
    let output_tokens = (tokens_used as f64 * 0.4) as usize;
    let cost = (input_tokens as f64 / 1000.0) * input_rate + (output_tokens as f64 / 1000.0) * output_rate;
    (cost * 10_000.0).round() / 10_000.0
}
