//! Affected-set differencer — pure comparison of two affected lists.

use uuid::Uuid;

use crate::disturbance::Affected;

/// Return every element of `old` with no `(party_id, reference)` match in
/// `new`, in `old` order.
///
/// `new = None` means the update did not touch the affected list at all,
/// which must not be read as "remove everyone" — the result is empty.
pub fn removed_affected(old: &[Affected], new: Option<&[Affected]>) -> Vec<Affected> {
  let Some(new) = new else {
    return Vec::new();
  };
  old
    .iter()
    .filter(|kept| !new.iter().any(|incoming| incoming.same_identity(kept)))
    .cloned()
    .collect()
}

/// Look up the reference value for `party_id` in an affected list.
/// Returns an empty string when the party is not present.
pub fn reference_for_party(affected: &[Affected], party_id: Uuid) -> String {
  affected
    .iter()
    .find(|a| a.party_id == party_id)
    .map(|a| a.reference.clone())
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn affected(reference: &str) -> Affected {
    Affected { party_id: Uuid::new_v4(), reference: reference.to_owned() }
  }

  #[test]
  fn absent_new_list_removes_nothing() {
    let old = vec![affected("p1"), affected("p2")];
    assert!(removed_affected(&old, None).is_empty());
  }

  #[test]
  fn returns_elements_missing_from_new_list() {
    let p1 = affected("p1");
    let p2 = affected("p2");
    let p3 = affected("p3");

    let old = vec![p1.clone(), p2.clone(), p3.clone()];
    let new = vec![p1.clone(), p3.clone()];

    assert_eq!(removed_affected(&old, Some(&new)), vec![p2]);
  }

  #[test]
  fn empty_new_list_removes_everyone_in_old_order() {
    let p1 = affected("p1");
    let p2 = affected("p2");
    let old = vec![p1.clone(), p2.clone()];

    assert_eq!(removed_affected(&old, Some(&[])), vec![p1, p2]);
  }

  #[test]
  fn changed_reference_counts_as_removed() {
    let party_id = Uuid::new_v4();
    let old = vec![Affected { party_id, reference: "old spot".into() }];
    let new = vec![Affected { party_id, reference: "new spot".into() }];

    assert_eq!(removed_affected(&old, Some(&new)), old);
  }

  #[test]
  fn reference_lookup_falls_back_to_empty() {
    let a = affected("Storgatan 1");
    assert_eq!(reference_for_party(&[a.clone()], a.party_id), "Storgatan 1");
    assert_eq!(reference_for_party(&[a], Uuid::new_v4()), "");
  }
}
