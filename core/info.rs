/*!
This module holds the static fertilizer info table: a presentation-only mapping from a fertilizer code to a display name and description. The table is independent of the model and is not assumed to cover every code the model can predict, so lookups fall back to a placeholder entry.
*/

use fnv::FnvHashMap;
use once_cell::sync::Lazy;

#[derive(Debug, PartialEq)]
pub struct FertilizerInfo {
	pub name: &'static str,
	pub description: &'static str,
}

pub static UNKNOWN_FERTILIZER: FertilizerInfo = FertilizerInfo {
	name: "Unknown Fertilizer",
	description: "No details available for this fertilizer.",
};

static FERTILIZER_INFO: Lazy<FnvHashMap<&'static str, FertilizerInfo>> = Lazy::new(|| {
	let mut info = FnvHashMap::default();
	info.insert(
		"10-26-26",
		FertilizerInfo {
			name: "Diammonium Phosphate (DAP)",
			description: "Provides nitrogen and phosphorus essential for plant growth, especially in the early stages.",
		},
	);
	info.insert(
		"14-35-14",
		FertilizerInfo {
			name: "GROMOR",
			description: "A balanced fertilizer for crops needing moderate nitrogen and higher phosphorus and potassium.",
		},
	);
	info.insert(
		"17-17-17",
		FertilizerInfo {
			name: "NPK 17-17-17 (SOP)",
			description: "A balanced fertilizer that supplies equal parts nitrogen, phosphorus, and potassium.",
		},
	);
	info.insert(
		"20-20",
		FertilizerInfo {
			name: "Ammonium Sulfate",
			description: "Helps improve soil nitrogen and sulfur levels for leafy crops.",
		},
	);
	info.insert(
		"28-28",
		FertilizerInfo {
			name: "Urea + Phosphate",
			description: "Good for overall plant development and flowering in neutral soils.",
		},
	);
	info.insert(
		"0-52-34",
		FertilizerInfo {
			name: "Mono Potassium Phosphate",
			description: "Used to increase flowering and fruiting with high phosphorus and potassium.",
		},
	);
	info.insert(
		"Urea",
		FertilizerInfo {
			name: "Urea",
			description: "Highly concentrated nitrogen fertilizer that boosts leaf and stem growth.",
		},
	);
	info.insert(
		"DAP",
		FertilizerInfo {
			name: "DAP (Diammonium Phosphate)",
			description: "Quick nitrogen supply and enhances root strength.",
		},
	);
	info
});

/// Look up the info for a fertilizer code, falling back to the placeholder entry for codes the table does not cover.
pub fn fertilizer_info(code: &str) -> &'static FertilizerInfo {
	FERTILIZER_INFO.get(code).unwrap_or(&UNKNOWN_FERTILIZER)
}

#[test]
fn test_lookup_hits_for_known_codes() {
	let info = fertilizer_info("Urea");
	assert_eq!(info.name, "Urea");
	let info = fertilizer_info("28-28");
	assert_eq!(info.name, "Urea + Phosphate");
}

#[test]
fn test_lookup_falls_back_for_unknown_codes() {
	let info = fertilizer_info("15-15-15");
	assert_eq!(info.name, "Unknown Fertilizer");
	assert_eq!(info.description, "No details available for this fertilizer.");
}
