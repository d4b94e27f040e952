/// `food_agriculture` -> `Food Agriculture`. Only the first letter of each
/// segment changes; the rest of the segment is left as written.
pub fn display_label(key: &str) -> String {
    key.split('_')
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Dataset label: `Country > Industry > Pillar` with absent parts dropped.
pub fn selection_label(country_name: &str, industry: Option<&str>, pillar: Option<&str>) -> String {
    let mut label = country_name.to_string();
    for part in [industry, pillar].into_iter().flatten() {
        label.push_str(" > ");
        label.push_str(&display_label(part));
    }
    label
}
