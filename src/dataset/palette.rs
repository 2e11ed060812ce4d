/// Dataset colours, handed out in order
pub const PALETTE: [&str; 6] = [
    "#9b59b6", // purple
    "#34495e", // slate
    "#e74c3c", // red
    "#f39c12", // orange
    "#3498db", // blue
    "#2ecc71", // green
];

/// First palette colour not in `used`; once all are taken the palette
/// cycles by the number of colours already handed out.
pub fn available_color<'a, I>(used: I) -> &'static str
where
    I: IntoIterator<Item = &'a str>,
{
    let used: Vec<&str> = used.into_iter().collect();
    PALETTE
        .iter()
        .copied()
        .find(|color| !used.contains(color))
        .unwrap_or(PALETTE[used.len() % PALETTE.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_unused_color() {
        assert_eq!(available_color([]), "#9b59b6");
        assert_eq!(available_color(["#9b59b6"]), "#34495e");
        assert_eq!(available_color(["#34495e"]), "#9b59b6");
    }

    #[test]
    fn test_cycles_when_exhausted() {
        let mut used: Vec<&str> = PALETTE.to_vec();
        assert_eq!(available_color(used.iter().copied()), PALETTE[0]);
        used.push(PALETTE[0]);
        assert_eq!(available_color(used.iter().copied()), PALETTE[1]);
    }
}
