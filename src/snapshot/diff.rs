//! Snapshot comparison

use std::cmp::Ordering;

use bigdecimal::{BigDecimal, Zero};

use super::{BalancesSnapshot, SnapshotKey};

/// Change of one balance between two snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct DiffEntry {
    pub key: SnapshotKey,
    /// `None` when the key is new
    pub old: Option<BigDecimal>,
    /// `None` when the key was removed
    pub new: Option<BigDecimal>,
    /// `new - old`, an absent side counting as zero
    pub delta: BigDecimal,
}

impl DiffEntry {
    pub fn old_or_zero(&self) -> BigDecimal {
        self.old.clone().unwrap_or_else(BigDecimal::zero)
    }

    pub fn new_or_zero(&self) -> BigDecimal {
        self.new.clone().unwrap_or_else(BigDecimal::zero)
    }

    pub fn is_added(&self) -> bool {
        self.old.is_none()
    }

    pub fn is_removed(&self) -> bool {
        self.new.is_none()
    }

    pub fn is_changed(&self) -> bool {
        !self.delta.is_zero()
    }
}

/// Compare two snapshots key by key.
///
/// Covers the union of both key sets in [`SnapshotKey`] order. Every key gets
/// an entry, including those whose delta is zero.
///
/// # Examples
///
/// ```
/// use balancescan::{diff, BalancesSnapshot, Network, SnapshotKey};
/// use bigdecimal::BigDecimal;
///
/// let key = |address: &str| SnapshotKey::new("ETH", Network::Ethereum, None, address);
/// let old: BalancesSnapshot = [(key("a"), BigDecimal::from(10))].into_iter().collect();
/// let new: BalancesSnapshot = [(key("b"), BigDecimal::from(5))].into_iter().collect();
///
/// let entries = diff(&old, &new);
/// assert_eq!(entries[0].delta, BigDecimal::from(-10));
/// assert_eq!(entries[1].delta, BigDecimal::from(5));
/// ```
pub fn diff(old: &BalancesSnapshot, new: &BalancesSnapshot) -> Vec<DiffEntry> {
    let mut old_entries = old.iter().peekable();
    let mut new_entries = new.iter().peekable();
    let mut entries = Vec::with_capacity(old.len().max(new.len()));

    // Both sides iterate in key order, so a merge yields the sorted union.
    loop {
        let order = match (old_entries.peek(), new_entries.peek()) {
            (None, None) => break,
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (Some((old_key, _)), Some((new_key, _))) => old_key.cmp(new_key),
        };

        let (key, old_amount, new_amount) = match order {
            Ordering::Less => match old_entries.next() {
                Some((key, amount)) => (key, Some(amount), None),
                None => break,
            },
            Ordering::Greater => match new_entries.next() {
                Some((key, amount)) => (key, None, Some(amount)),
                None => break,
            },
            Ordering::Equal => match (old_entries.next(), new_entries.next()) {
                (Some((key, old_amount)), Some((_, new_amount))) => {
                    (key, Some(old_amount), Some(new_amount))
                }
                _ => break,
            },
        };

        let zero = BigDecimal::zero();
        let delta = new_amount.unwrap_or(&zero) - old_amount.unwrap_or(&zero);
        entries.push(DiffEntry {
            key: key.clone(),
            old: old_amount.cloned(),
            new: new_amount.cloned(),
            delta,
        });
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::network::Network;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn key(ticker: &str, address: &str) -> SnapshotKey {
        SnapshotKey::new(ticker, Network::Ethereum, None, address)
    }

    fn snapshot(entries: &[(&str, &str, &str)]) -> BalancesSnapshot {
        entries
            .iter()
            .map(|(ticker, address, amount)| (key(ticker, address), dec(amount)))
            .collect()
    }

    #[test]
    fn test_diff_with_itself_is_all_zero() {
        let s = snapshot(&[("ETH", "0xa", "1.5"), ("ETH", "0xb", "0"), ("USDT", "0xa", "100")]);
        let entries = diff(&s, &s);
        assert_eq!(entries.len(), 3);
        for entry in entries {
            assert!(entry.delta.is_zero(), "{}", entry.key);
            assert!(!entry.is_changed());
            assert!(entry.old.is_some() && entry.new.is_some());
        }
    }

    #[test]
    fn test_added_and_removed_keys() {
        let old = snapshot(&[("ETH", "A", "10")]);
        let new = snapshot(&[("ETH", "B", "5")]);

        let entries = diff(&old, &new);

        assert_eq!(
            entries,
            vec![
                DiffEntry {
                    key: key("ETH", "A"),
                    old: Some(dec("10")),
                    new: None,
                    delta: dec("-10"),
                },
                DiffEntry {
                    key: key("ETH", "B"),
                    old: None,
                    new: Some(dec("5")),
                    delta: dec("5"),
                },
            ]
        );
        assert!(entries[0].is_removed());
        assert_eq!(entries[0].new_or_zero(), BigDecimal::zero());
        assert!(entries[1].is_added());
        assert_eq!(entries[1].old_or_zero(), BigDecimal::zero());
    }

    #[test]
    fn test_union_is_sorted_by_key() {
        let old = snapshot(&[("USDT", "0xa", "1"), ("ETH", "0xc", "2")]);
        let new = snapshot(&[("ETH", "0xb", "3"), ("ETH", "0xc", "2.5"), ("BTC", "0xz", "1")]);

        let entries = diff(&old, &new);
        let keys: Vec<_> = entries
            .iter()
            .map(|e| (e.key.ticker.as_str(), e.key.address.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![("BTC", "0xz"), ("ETH", "0xb"), ("ETH", "0xc"), ("USDT", "0xa")]
        );
        assert_eq!(entries[2].delta, dec("0.5"));
        assert_eq!(entries[3].delta, dec("-1"));
    }

    #[test]
    fn test_empty_snapshots() {
        assert!(diff(&BalancesSnapshot::new(), &BalancesSnapshot::new()).is_empty());
    }
}
