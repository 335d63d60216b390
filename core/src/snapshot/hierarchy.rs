//! Parent/child classification and hierarchy-level derivations.
//!
//! Represented flat: `account_id -> index` via the `BTreeMap` in
//! `Snapshot::accounts`, and `children_of: parent_id -> [account_id]`.
//! No pointers, no cycles.

use std::collections::BTreeMap;

use crate::error::ValidationIssue;
use crate::model::{Account, AccountId};

/// Result of resolving parent/child relationships for one snapshot.
pub struct HierarchyResolution {
    pub children_of: BTreeMap<AccountId, Vec<AccountId>>,
    pub virtual_parent_groups: BTreeMap<AccountId, Vec<AccountId>>,
    /// Non-fatal findings: self-references cleared, orphans demoted to
    /// virtual-parent groups. Surfaced to the caller, never silently
    /// dropped.
    pub warnings: Vec<ValidationIssue>,
}

/// Classify every account as parent or child, clear self-references
/// (treating them as parents, with a warning), and group orphan
/// children — whose pointed-at parent is absent from the snapshot —
/// into virtual-parent groups owned by the child's own owner for
/// display, excluded from balance math.
pub fn resolve_hierarchy(accounts: &mut BTreeMap<AccountId, Account>) -> HierarchyResolution {
    let mut warnings = Vec::new();

    // Self-references: clear and flag before anything else reads
    // `ultimate_parent_id`.
    for (id, account) in accounts.iter_mut() {
        let is_self_reference = matches!(&account.ultimate_parent_id, Some(p) if p == id);
        if is_self_reference {
            account.ultimate_parent_id = None;
            warnings.push(ValidationIssue {
                entity: format!("account:{id}"),
                detail: "ultimate_parent_id self-referenced this account; cleared and treated as parent"
                    .to_string(),
            });
        }
    }

    let known_ids: std::collections::BTreeSet<AccountId> = accounts.keys().cloned().collect();

    let mut children_of: BTreeMap<AccountId, Vec<AccountId>> = BTreeMap::new();
    let mut virtual_parent_groups: BTreeMap<AccountId, Vec<AccountId>> = BTreeMap::new();

    for (id, account) in accounts.iter() {
        if account.is_parent() {
            continue;
        }
        let parent_id = account.ultimate_parent_id.clone().unwrap_or_default();
        if known_ids.contains(&parent_id) {
            children_of.entry(parent_id).or_default().push(id.clone());
        } else {
            warnings.push(ValidationIssue {
                entity: format!("account:{id}"),
                detail: format!(
                    "ultimate_parent_id '{parent_id}' not present in snapshot; treated as a virtual-parent group"
                ),
            });
            virtual_parent_groups.entry(parent_id).or_default().push(id.clone());
        }
    }

    let orphan_ids: Vec<AccountId> = virtual_parent_groups.values().flatten().cloned().collect();
    for child_id in orphan_ids {
        if let Some(child) = accounts.get_mut(&child_id) {
            child.is_virtual_parent = true;
        }
    }

    HierarchyResolution {
        children_of,
        virtual_parent_groups,
        warnings,
    }
}

/// Propagate customer/prospect classification to the whole hierarchy:
/// any positive booked ARR anywhere in a parent's hierarchy makes that
/// whole hierarchy a Customer.
pub fn classify_customer_prospect(
    accounts: &mut BTreeMap<AccountId, Account>,
    children_of: &BTreeMap<AccountId, Vec<AccountId>>,
) {
    let parent_ids: Vec<AccountId> = accounts
        .iter()
        .filter(|(_, a)| a.is_parent() && !a.is_virtual_parent)
        .map(|(id, _)| id.clone())
        .collect();

    for parent_id in parent_ids {
        let mut hierarchy_arr = accounts.get(&parent_id).map(|a| a.arr).unwrap_or(0);
        let mut is_customer = hierarchy_arr > 0;

        if let Some(child_ids) = children_of.get(&parent_id) {
            for child_id in child_ids {
                if let Some(child) = accounts.get(child_id) {
                    hierarchy_arr += child.arr;
                    if child.arr > 0 {
                        is_customer = true;
                    }
                }
            }
        }

        if let Some(parent) = accounts.get_mut(&parent_id) {
            parent.hierarchy_bookings_arr = hierarchy_arr;
            parent.is_customer = is_customer;
        }
        if let Some(child_ids) = children_of.get(&parent_id) {
            for child_id in child_ids.clone() {
                if let Some(child) = accounts.get_mut(&child_id) {
                    child.hierarchy_bookings_arr = hierarchy_arr;
                    child.is_customer = is_customer;
                }
            }
        }
    }
}

/// Flag parent/child ownership divergence. Must
/// run after assignment proposals have been written back into
/// `new_owner_id`.
pub fn recompute_split_ownership(
    accounts: &mut BTreeMap<AccountId, Account>,
    children_of: &BTreeMap<AccountId, Vec<AccountId>>,
) {
    for (parent_id, child_ids) in children_of {
        let parent_owner = accounts.get(parent_id).and_then(|a| a.new_owner_id.clone());
        for child_id in child_ids {
            if let Some(child) = accounts.get_mut(child_id) {
                child.has_split_ownership = match (&parent_owner, &child.new_owner_id) {
                    (Some(p), Some(c)) => p != c,
                    _ => false,
                };
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Account;

    fn account(id: &str, parent: Option<&str>, arr: i64) -> Account {
        Account {
            account_id: id.to_string(),
            display_name: id.to_string(),
            ultimate_parent_id: parent.map(|p| p.to_string()),
            arr,
            atr: 0,
            calculated_arr: 0,
            calculated_atr: 0,
            hierarchy_bookings_arr: 0,
            expansion_tier: None,
            initial_sale_tier: None,
            sales_territory: None,
            geo: None,
            hq_country: None,
            renewal_quarter: None,
            cre_count: 0,
            cre_risk: None,
            risk_flag: false,
            cre_status: None,
            owner_id: None,
            owner_name: None,
            new_owner_id: None,
            new_owner_name: None,
            is_strategic: false,
            is_manual_holdover: false,
            strategic_rep_id: None,
            is_customer: false,
            has_split_ownership: false,
            is_virtual_parent: false,
        }
    }

    #[test]
    fn self_referencing_row_becomes_a_parent_with_a_warning() {
        let mut accounts = BTreeMap::new();
        accounts.insert("A1".to_string(), account("A1", Some("A1"), 100));
        let res = resolve_hierarchy(&mut accounts);
        assert!(accounts["A1"].is_parent());
        assert_eq!(res.warnings.len(), 1);
    }

    #[test]
    fn orphan_child_becomes_a_virtual_parent_group_and_is_excluded_from_balance_math() {
        let mut accounts = BTreeMap::new();
        accounts.insert("C1".to_string(), account("C1", Some("MISSING"), 50));
        let res = resolve_hierarchy(&mut accounts);
        assert!(res.virtual_parent_groups.contains_key("MISSING"));
        assert!(accounts["C1"].is_virtual_parent);
    }

    #[test]
    fn hierarchy_with_any_positive_arr_is_a_customer() {
        let mut accounts = BTreeMap::new();
        accounts.insert("P1".to_string(), account("P1", None, 0));
        accounts.insert("C1".to_string(), account("C1", Some("P1"), 500));
        let res = resolve_hierarchy(&mut accounts);
        classify_customer_prospect(&mut accounts, &res.children_of);
        assert!(accounts["P1"].is_customer);
        assert!(accounts["C1"].is_customer);
        assert_eq!(accounts["P1"].hierarchy_bookings_arr, 500);
    }

    #[test]
    fn all_zero_arr_hierarchy_is_a_prospect() {
        let mut accounts = BTreeMap::new();
        accounts.insert("P1".to_string(), account("P1", None, 0));
        accounts.insert("C1".to_string(), account("C1", Some("P1"), 0));
        let res = resolve_hierarchy(&mut accounts);
        classify_customer_prospect(&mut accounts, &res.children_of);
        assert!(!accounts["P1"].is_customer);
    }

    #[test]
    fn split_ownership_flags_children_whose_owner_diverges_from_parent() {
        let mut accounts = BTreeMap::new();
        let mut p = account("P1", None, 100);
        p.new_owner_id = Some("R1".to_string());
        let mut c = account("C1", Some("P1"), 50);
        c.new_owner_id = Some("R2".to_string());
        accounts.insert("P1".to_string(), p);
        accounts.insert("C1".to_string(), c);
        let res = resolve_hierarchy(&mut accounts);
        recompute_split_ownership(&mut accounts, &res.children_of);
        assert!(accounts["C1"].has_split_ownership);
    }
}
