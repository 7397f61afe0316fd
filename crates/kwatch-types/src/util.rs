/// Every prefix of `s` that ends just before a separator, plus `s` itself.
/// "thing-operator-675ffd4bbb" yields "thing", "thing-operator",
/// "thing-operator-675ffd4bbb". Used to seed filter autocompletion.
pub fn prefix_splits(s: &str, sep: char) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }

    let mut result: Vec<String> = s
        .char_indices()
        .filter(|&(_, c)| c == sep)
        .map(|(i, _)| s[..i].to_string())
        .collect();
    result.push(s.to_string());
    result
}
