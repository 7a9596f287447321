/// Name fragments of virtual / tunnel adapters skipped in automatic mode.
pub const EXCLUDED_ADAPTER_PATTERNS: [&str; 5] = ["loopback", "isatap", "pseudo", "teredo", "6to4"];

/// Pick the adapter to monitor.
///
/// With `wanted = Some(fragment)` the first adapter whose name contains the
/// fragment (case-insensitive) wins. With `None` (automatic mode) the first
/// adapter not matching [`EXCLUDED_ADAPTER_PATTERNS`] wins; if every adapter is
/// excluded the unfiltered list is used instead.
pub fn select_adapter(names: &[String], wanted: Option<&str>) -> Option<String> {
    if let Some(wanted) = wanted {
        let wanted = wanted.to_lowercase();
        return names
            .iter()
            .find(|name| name.to_lowercase().contains(&wanted))
            .cloned();
    }

    names
        .iter()
        .find(|name| !is_virtual(name))
        .or_else(|| names.first())
        .cloned()
}

/// `true` for loopback and tunnel adapters.
pub fn is_virtual(name: &str) -> bool {
    let lower = name.to_lowercase();
    // Linux names its loopback plain "lo".
    lower == "lo" || EXCLUDED_ADAPTER_PATTERNS.iter().any(|p| lower.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn auto_skips_loopback_and_tunnels() {
        let pool = names(&["Loopback0", "Ethernet", "ISATAP Tunnel"]);
        assert_eq!(select_adapter(&pool, None).as_deref(), Some("Ethernet"));
    }

    #[test]
    fn auto_falls_back_to_unfiltered_pool() {
        let pool = names(&["Teredo Tunneling Pseudo-Interface", "6to4 Adapter"]);
        assert_eq!(
            select_adapter(&pool, None).as_deref(),
            Some("Teredo Tunneling Pseudo-Interface")
        );
    }

    #[test]
    fn explicit_name_is_case_insensitive_substring() {
        let pool = names(&["Ethernet", "Intel(R) Wi-Fi 6 AX201"]);
        assert_eq!(
            select_adapter(&pool, Some("wi-fi")).as_deref(),
            Some("Intel(R) Wi-Fi 6 AX201")
        );
    }

    #[test]
    fn explicit_name_without_match_disables() {
        let pool = names(&["Ethernet"]);
        assert_eq!(select_adapter(&pool, Some("wlan0")), None);
    }

    #[test]
    fn empty_pool_selects_nothing() {
        assert_eq!(select_adapter(&[], None), None);
    }

    #[test]
    fn linux_loopback_is_virtual() {
        let pool = names(&["enp3s0", "lo"]);
        assert!(is_virtual("lo"));
        assert!(!is_virtual("enp3s0"));
        assert_eq!(select_adapter(&names(&["lo", "enp3s0"]), None).as_deref(), Some("enp3s0"));
        assert_eq!(select_adapter(&pool, None).as_deref(), Some("enp3s0"));
    }
}
