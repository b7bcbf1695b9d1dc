//! core::naming
//!
//! Naming rules applied when facades are renamed.
//!
//! # Features
//!
//! - Upper/lower camel casing of the first character
//! - Indicator normalization (`Ind` suffix, no `is` prefix)
//! - Names derived from an assigned type for reference properties
//! - Unique default names inside a container

/// The rule a facade category applies to caller-supplied names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingRule {
    /// Leave the trimmed name as given.
    Verbatim,
    /// First character upper-cased (members, elements).
    UpperFirst,
    /// First character lower-cased (attributes).
    LowerFirst,
    /// Lower-camel with an `Ind` suffix and no leading `is`.
    Indicator,
    /// Name is derived from the assigned type; caller input is used only
    /// while no type is assigned.
    FromType,
}

impl NamingRule {
    /// Apply the rule to a caller-supplied name.
    ///
    /// # Example
    ///
    /// ```
    /// use dexedit::core::naming::NamingRule;
    ///
    /// assert_eq!(NamingRule::LowerFirst.apply("Code"), "code");
    /// assert_eq!(NamingRule::UpperFirst.apply("profile"), "Profile");
    /// assert_eq!(NamingRule::Indicator.apply("isActive"), "activeInd");
    /// ```
    pub fn apply(self, name: &str) -> String {
        let name = name.trim();
        match self {
            NamingRule::Verbatim | NamingRule::FromType => name.to_string(),
            NamingRule::UpperFirst => upper_first(name),
            NamingRule::LowerFirst => lower_first(name),
            NamingRule::Indicator => indicator_name(name),
        }
    }
}

/// Upper-case the first character.
pub fn upper_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-case the first character.
pub fn lower_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Normalize an indicator name.
///
/// A leading `is` is dropped when followed by an upper-case letter (so
/// `island` survives), the first character is lower-cased, and `Ind` is
/// appended unless already present.
///
/// # Example
///
/// ```
/// use dexedit::core::naming::indicator_name;
///
/// assert_eq!(indicator_name("isSmoking"), "smokingInd");
/// assert_eq!(indicator_name("smokingInd"), "smokingInd");
/// assert_eq!(indicator_name("island"), "islandInd");
/// ```
pub fn indicator_name(name: &str) -> String {
    let trimmed = name.trim();
    let stripped = match trimmed.strip_prefix("is") {
        Some(rest) if rest.starts_with(|c: char| c.is_uppercase()) => rest,
        _ => trimmed,
    };

    let mut result = lower_first(stripped);
    if result.is_empty() {
        result.push_str("new");
    }
    if !result.ends_with("Ind") {
        result.push_str("Ind");
    }
    result
}

/// Name a reference property after its assigned type.
///
/// Reference names carry a `Ref` suffix; attribute references are
/// lower-camel, element references upper-camel.
///
/// # Example
///
/// ```
/// use dexedit::core::naming::reference_name;
///
/// assert_eq!(reference_name("Profile", false), "ProfileRef");
/// assert_eq!(reference_name("Profile", true), "profileRef");
/// ```
pub fn reference_name(type_name: &str, attribute: bool) -> String {
    let base = if attribute {
        lower_first(type_name)
    } else {
        upper_first(type_name)
    };
    if base.ends_with("Ref") {
        base
    } else {
        format!("{base}Ref")
    }
}

/// Pick `base`, or `base` followed by the smallest number that is not taken.
///
/// # Example
///
/// ```
/// use dexedit::core::naming::unique_name;
///
/// let taken = ["newAttribute", "newAttribute1"];
/// assert_eq!(unique_name("newAttribute", &taken), "newAttribute2");
/// assert_eq!(unique_name("code", &taken), "code");
/// ```
pub fn unique_name<S: AsRef<str>>(base: &str, taken: &[S]) -> String {
    let is_taken = |candidate: &str| taken.iter().any(|t| t.as_ref() == candidate);
    if !is_taken(base) {
        return base.to_string();
    }
    (1u32..)
        .map(|n| format!("{base}{n}"))
        .find(|candidate| !is_taken(candidate))
        .unwrap_or_else(|| base.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_char_casing() {
        assert_eq!(upper_first("code"), "Code");
        assert_eq!(lower_first("Code"), "code");
        assert_eq!(lower_first(""), "");
        assert_eq!(upper_first("émile"), "Émile");
    }

    #[test]
    fn indicator_strips_is_prefix() {
        assert_eq!(indicator_name("isPrimary"), "primaryInd");
        assert_eq!(indicator_name("IsPrimary"), "isPrimaryInd");
        assert_eq!(indicator_name("is"), "isInd");
    }

    #[test]
    fn indicator_keeps_existing_suffix() {
        assert_eq!(indicator_name("activeInd"), "activeInd");
        assert_eq!(indicator_name("ActiveInd"), "activeInd");
    }

    #[test]
    fn indicator_of_blank_name() {
        assert_eq!(indicator_name("  "), "newInd");
    }

    #[test]
    fn rules_trim_input() {
        assert_eq!(NamingRule::Verbatim.apply("  ABC "), "ABC");
        assert_eq!(NamingRule::LowerFirst.apply(" Amount"), "amount");
    }

    #[test]
    fn reference_names_do_not_double_suffix() {
        assert_eq!(reference_name("ProfileRef", false), "ProfileRef");
    }

    #[test]
    fn unique_name_skips_taken_numbers() {
        let taken = vec!["a".to_string(), "a1".to_string(), "a3".to_string()];
        assert_eq!(unique_name("a", &taken), "a2");
    }
}
