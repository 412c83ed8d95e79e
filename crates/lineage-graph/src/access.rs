//! Read filtering shared by every backend

use lineage_domain::{Authorizations, Property, Visibility};

/// Whether an element with this state is visible to the caller
pub(crate) fn is_readable(
    visibility: &Visibility,
    hidden: &[Visibility],
    deleted: bool,
    authorizations: &Authorizations,
) -> bool {
    !deleted
        && visibility.can_read(authorizations)
        && !hidden.iter().any(|h| h.can_read(authorizations))
}

/// The properties the caller may read
pub(crate) fn readable_properties(
    properties: &[Property],
    authorizations: &Authorizations,
) -> Vec<Property> {
    properties
        .iter()
        .filter(|p| p.visibility.can_read(authorizations))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tombstone_hides_everything() {
        let auths = Authorizations::new(["a"]);
        assert!(is_readable(&Visibility::new("a"), &[], false, &auths));
        assert!(!is_readable(&Visibility::new("a"), &[], true, &auths));
    }

    #[test]
    fn test_hidden_is_scoped_to_its_label() {
        let hidden = [Visibility::new("ws1")];
        assert!(!is_readable(&Visibility::empty(), &hidden, false, &Authorizations::new(["ws1"])));
        assert!(is_readable(&Visibility::empty(), &hidden, false, &Authorizations::new(["ws2"])));
    }

    #[test]
    fn test_property_filtering() {
        let props = vec![
            Property::new("", "open", "x", Visibility::empty()),
            Property::new("", "closed", "y", Visibility::new("secret")),
        ];
        let readable = readable_properties(&props, &Authorizations::empty());
        assert_eq!(readable.len(), 1);
        assert_eq!(readable[0].name, "open");
    }
}
