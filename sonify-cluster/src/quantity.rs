// Sonify Cluster - Resource quantities
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! Parsing of resource request quantities.
//!
//! Only the forms used for usage estimates are understood; anything else
//! counts as zero.

/// CPU quantity in cores: `"100m"` is 0.1, `"2"` is 2.0.
pub fn parse_cpu(quantity: &str) -> f64 {
    let quantity = quantity.trim();
    match quantity.strip_suffix('m') {
        Some(millis) => millis.parse::<f64>().map(|m| m / 1000.0).unwrap_or(0.0),
        None => quantity.parse::<f64>().unwrap_or(0.0),
    }
}

/// Memory quantity in MiB: `"128Mi"` is 128, `"1Gi"` is 1024.
pub fn parse_memory(quantity: &str) -> f64 {
    let quantity = quantity.trim();
    if let Some(mib) = quantity.strip_suffix("Mi") {
        mib.parse::<f64>().unwrap_or(0.0)
    } else if let Some(gib) = quantity.strip_suffix("Gi") {
        gib.parse::<f64>().map(|g| g * 1024.0).unwrap_or(0.0)
    } else {
        0.0
    }
}
