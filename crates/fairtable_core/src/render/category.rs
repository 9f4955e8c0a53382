//! Four-letter codes for the standard fair categories.

const CATEGORY_CODES: &[(&str, &str)] = &[
    ("Animal Sciences", "ANIM"),
    ("Behavioral and Social Sciences", "BEHA"),
    ("Biochemistry", "BCHM"),
    (
        "Biomedical/Health Sciences, and Biomedical Engineering",
        "BMED",
    ),
    ("Cellular and Molecular Biology", "CELL"),
    ("Chemistry", "CHEM"),
    ("Computational Biology and Bioinformatics", "CBIO"),
    ("Computer Science and Systems Software", "COMP"),
    ("Earth and Environmental Sciences", "EAEV"),
    ("Engineering: Electrical, Mechanical, and Robotics", "EEMR"),
    ("Engineering: Energy, Materials, and Transport", "EEMT"),
    ("Mathematics", "MATH"),
    ("Microbiology", "MCRO"),
    ("Physics and Astronomy", "PHYS"),
    ("Plant Sciences", "PLNT"),
    ("Product Testing", "PROD"),
];

/// Known categories with their codes, in legend order.
pub fn known_categories() -> &'static [(&'static str, &'static str)] {
    CATEGORY_CODES
}

/// Returns the code for `category`.
///
/// Exact names win, then names contained in `category`; anything else is
/// shortened to its first four characters, upper-cased.
pub fn category_abbreviation(category: &str) -> String {
    if let Some((_, code)) = CATEGORY_CODES.iter().find(|(name, _)| *name == category) {
        return (*code).to_string();
    }
    if let Some((_, code)) = CATEGORY_CODES
        .iter()
        .find(|(name, _)| category.contains(name))
    {
        return (*code).to_string();
    }
    if category.chars().count() >= 4 {
        category.chars().take(4).collect::<String>().to_uppercase()
    } else {
        category.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::category_abbreviation;

    #[test]
    fn known_names_map_to_codes() {
        assert_eq!(category_abbreviation("Chemistry"), "CHEM");
        assert_eq!(
            category_abbreviation("Senior Division - Physics and Astronomy"),
            "PHYS"
        );
    }

    #[test]
    fn unknown_names_are_shortened() {
        assert_eq!(category_abbreviation("Robotics Club"), "ROBO");
        assert_eq!(category_abbreviation("Art"), "Art");
    }
}
