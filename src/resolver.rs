use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::error::{AccountResolutionError, LookupUnresolved};
use crate::programs::wide_u64;
use crate::types::{
    AccountAddress, AccountRef, CompiledInstruction, MessageHeader, RawInstruction,
    TransactionMessage,
};

/// Contents of a fetched address lookup table account.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupTableState {
    pub addresses: Vec<Address>,
    #[serde(default)]
    pub authority: Option<Address>,
    #[serde(with = "wide_u64")]
    pub deactivation_slot: u64,
    #[serde(with = "wide_u64", default)]
    pub last_extended_slot: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", content = "table", rename_all = "camelCase")]
pub enum FetchStatus {
    Fetching,
    Failed,
    Fetched(Arc<LookupTableState>),
}

/// Read-only view of the lookup-table fetch cache. `None` means never requested.
pub trait LookupTableSource {
    fn lookup_table(&self, table: &Address) -> Option<FetchStatus>;
}

impl LookupTableSource for HashMap<Address, FetchStatus> {
    fn lookup_table(&self, table: &Address) -> Option<FetchStatus> {
        self.get(table).cloned()
    }
}

/// A cache shared with an in-flight fetcher. Never blocks: a held write lock
/// reads as "fetching" for every table.
impl<T: LookupTableSource> LookupTableSource for RwLock<T> {
    fn lookup_table(&self, table: &Address) -> Option<FetchStatus> {
        match self.try_read() {
            Ok(cache) => cache.lookup_table(table),
            Err(_) => Some(FetchStatus::Fetching),
        }
    }
}

impl<T: LookupTableSource + ?Sized> LookupTableSource for Arc<T> {
    fn lookup_table(&self, table: &Address) -> Option<FetchStatus> {
        (**self).lookup_table(table)
    }
}

/// For legacy messages or callers without a cache.
pub struct NoLookupTables;

impl LookupTableSource for NoLookupTables {
    fn lookup_table(&self, _table: &Address) -> Option<FetchStatus> {
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "camelCase")]
pub enum AccountSource {
    Static,
    #[serde(rename_all = "camelCase")]
    Lookup { table: Address, table_index: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAccount {
    pub index: usize,
    pub address: AccountAddress,
    pub is_signer: bool,
    pub is_writable: bool,
    pub source: AccountSource,
}

pub fn validate_header(
    header: &MessageHeader,
    static_keys: usize,
) -> Result<(), AccountResolutionError> {
    if static_keys == 0 {
        return Err(AccountResolutionError::NoStaticAccounts);
    }
    if header.num_readonly_signed_accounts >= header.num_required_signatures {
        return Err(AccountResolutionError::ReadonlySignersExceedSigners {
            readonly_signed: header.num_readonly_signed_accounts,
            required: header.num_required_signatures,
        });
    }
    if usize::from(header.num_readonly_unsigned_accounts) >= static_keys {
        return Err(AccountResolutionError::ReadonlyUnsignedExceedAccounts {
            readonly_unsigned: header.num_readonly_unsigned_accounts,
            total: static_keys,
        });
    }
    if usize::from(header.num_required_signatures) > static_keys {
        return Err(AccountResolutionError::SignersExceedAccounts {
            required: header.num_required_signatures,
            total: static_keys,
        });
    }
    Ok(())
}

/// Merge static keys and lookup-table entries into the runtime's global index space.
///
/// Static keys keep message order (writable signers, readonly signers,
/// writable non-signers, readonly non-signers); then every lookup's writable
/// entries in message order, then every lookup's readonly entries.
pub fn resolve(
    message: &TransactionMessage,
    tables: &dyn LookupTableSource,
) -> Result<Vec<ResolvedAccount>, AccountResolutionError> {
    let header = &message.header;
    let static_len = message.account_keys.len();
    validate_header(header, static_len)?;

    let num_signers = usize::from(header.num_required_signatures);
    let writable_signers = num_signers - usize::from(header.num_readonly_signed_accounts);
    let writable_unsigned_end = static_len - usize::from(header.num_readonly_unsigned_accounts);

    let lookup_len: usize = message
        .address_table_lookups
        .iter()
        .map(|l| l.writable_indexes.len() + l.readonly_indexes.len())
        .sum();
    let mut resolved = Vec::with_capacity(static_len + lookup_len);

    for (index, key) in message.account_keys.iter().enumerate() {
        let is_signer = index < num_signers;
        let is_writable = if is_signer {
            index < writable_signers
        } else {
            index < writable_unsigned_end
        };
        resolved.push(ResolvedAccount {
            index,
            address: AccountAddress::Known(*key),
            is_signer,
            is_writable,
            source: AccountSource::Static,
        });
    }

    let statuses: Vec<Option<FetchStatus>> = message
        .address_table_lookups
        .iter()
        .map(|lookup| tables.lookup_table(&lookup.account_key))
        .collect();

    for is_writable in [true, false] {
        for (lookup, status) in message.address_table_lookups.iter().zip(&statuses) {
            let indexes = if is_writable {
                &lookup.writable_indexes
            } else {
                &lookup.readonly_indexes
            };
            for &table_index in indexes {
                let address = lookup_address(status.as_ref(), table_index);
                if let AccountAddress::Unresolved(reason) = address {
                    tracing::debug!(
                        table = %lookup.account_key,
                        table_index,
                        %reason,
                        "lookup table entry unresolved"
                    );
                }
                resolved.push(ResolvedAccount {
                    index: resolved.len(),
                    address,
                    is_signer: false,
                    is_writable,
                    source: AccountSource::Lookup {
                        table: lookup.account_key,
                        table_index,
                    },
                });
            }
        }
    }

    Ok(resolved)
}

fn lookup_address(status: Option<&FetchStatus>, table_index: u8) -> AccountAddress {
    match status {
        None => AccountAddress::Unresolved(LookupUnresolved::NotFetched),
        Some(FetchStatus::Fetching) => AccountAddress::Unresolved(LookupUnresolved::Fetching),
        Some(FetchStatus::Failed) => AccountAddress::Unresolved(LookupUnresolved::FetchFailed),
        Some(FetchStatus::Fetched(table)) => table
            .addresses
            .get(usize::from(table_index))
            .map_or(
                AccountAddress::Unresolved(LookupUnresolved::InvalidIndex {
                    table_index,
                    table_len: table.addresses.len(),
                }),
                |address| AccountAddress::Known(*address),
            ),
    }
}

pub fn account_ref(resolved: &[ResolvedAccount], index: u8) -> AccountRef {
    match resolved.get(usize::from(index)) {
        Some(account) => AccountRef {
            address: account.address,
            is_signer: account.is_signer,
            is_writable: account.is_writable,
        },
        None => AccountRef {
            address: AccountAddress::Unresolved(LookupUnresolved::AccountIndexOutOfRange {
                index,
                total: resolved.len(),
            }),
            is_signer: false,
            is_writable: false,
        },
    }
}

/// Materialize a compiled instruction against the resolved account list.
///
/// Fails only when the program id itself has no address.
pub fn raw_instruction(
    compiled: &CompiledInstruction,
    resolved: &[ResolvedAccount],
) -> Result<RawInstruction, LookupUnresolved> {
    let program = account_ref(resolved, compiled.program_id_index);
    let program_id = match program.address {
        AccountAddress::Known(address) => address,
        AccountAddress::Unresolved(reason) => return Err(reason),
    };
    Ok(RawInstruction {
        program_id,
        account_keys: compiled
            .accounts
            .iter()
            .map(|index| account_ref(resolved, *index))
            .collect(),
        data: compiled.data.clone(),
    })
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use super::*;
    use crate::types::AddressTableLookup;

    fn key(n: u8) -> Address {
        Address::new([n; 32])
    }

    fn header(required: u8, readonly_signed: u8, readonly_unsigned: u8) -> MessageHeader {
        MessageHeader {
            num_required_signatures: required,
            num_readonly_signed_accounts: readonly_signed,
            num_readonly_unsigned_accounts: readonly_unsigned,
        }
    }

    fn message(
        header: MessageHeader,
        keys: usize,
        lookups: Vec<AddressTableLookup>,
    ) -> TransactionMessage {
        TransactionMessage {
            header,
            account_keys: (0..keys).map(|n| key(u8::try_from(n).unwrap())).collect(),
            recent_blockhash: None,
            instructions: Vec::new(),
            address_table_lookups: lookups,
        }
    }

    fn table(first: u8, len: u8) -> FetchStatus {
        FetchStatus::Fetched(Arc::new(LookupTableState {
            addresses: (first..first + len).map(key).collect(),
            authority: None,
            deactivation_slot: u64::MAX,
            last_extended_slot: 0,
        }))
    }

    fn lcg_next(state: &mut u64) -> u64 {
        *state = state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        *state
    }

    #[test]
    fn static_keys_follow_header_permissions() {
        let msg = message(header(2, 1, 1), 4, Vec::new());
        let resolved = resolve(&msg, &NoLookupTables).unwrap();
        let flags: Vec<(bool, bool)> = resolved
            .iter()
            .map(|a| (a.is_signer, a.is_writable))
            .collect();
        assert_eq!(
            flags,
            vec![(true, true), (true, false), (false, true), (false, false)]
        );
        assert!(resolved.iter().all(|a| a.source == AccountSource::Static));
    }

    #[test]
    fn lookup_entries_follow_writable_then_readonly_across_tables() {
        let table_a = Address::new([200; 32]);
        let table_b = Address::new([201; 32]);
        let msg = message(
            header(1, 0, 0),
            2,
            vec![
                AddressTableLookup {
                    account_key: table_a,
                    writable_indexes: vec![1, 0],
                    readonly_indexes: vec![2],
                },
                AddressTableLookup {
                    account_key: table_b,
                    writable_indexes: vec![0],
                    readonly_indexes: vec![1],
                },
            ],
        );
        let tables = HashMap::from([(table_a, table(100, 3)), (table_b, table(150, 2))]);
        let resolved = resolve(&msg, &tables).unwrap();

        let addresses: Vec<AccountAddress> = resolved.iter().map(|a| a.address).collect();
        assert_eq!(
            addresses,
            vec![
                AccountAddress::Known(key(0)),
                AccountAddress::Known(key(1)),
                AccountAddress::Known(key(101)),
                AccountAddress::Known(key(100)),
                AccountAddress::Known(key(150)),
                AccountAddress::Known(key(102)),
                AccountAddress::Known(key(151)),
            ]
        );
        let writable: Vec<bool> = resolved.iter().map(|a| a.is_writable).collect();
        assert_eq!(writable, vec![true, true, true, true, true, false, false]);
        assert_eq!(
            resolved[4].source,
            AccountSource::Lookup {
                table: table_b,
                table_index: 0
            }
        );
        for (position, account) in resolved.iter().enumerate() {
            assert_eq!(account.index, position);
        }
    }

    #[test]
    fn missing_failed_and_out_of_bounds_tables_become_placeholders() {
        let fetched = Address::new([210; 32]);
        let failed = Address::new([211; 32]);
        let fetching = Address::new([212; 32]);
        let absent = Address::new([213; 32]);
        let lookup = |account_key| AddressTableLookup {
            account_key,
            writable_indexes: vec![5],
            readonly_indexes: Vec::new(),
        };
        let msg = message(
            header(1, 0, 0),
            1,
            vec![
                lookup(fetched),
                lookup(failed),
                lookup(fetching),
                lookup(absent),
            ],
        );
        let tables = HashMap::from([
            (fetched, table(0, 2)),
            (failed, FetchStatus::Failed),
            (fetching, FetchStatus::Fetching),
        ]);
        let resolved = resolve(&msg, &tables).unwrap();
        let addresses: Vec<AccountAddress> = resolved.iter().skip(1).map(|a| a.address).collect();
        assert_eq!(
            addresses,
            vec![
                AccountAddress::Unresolved(LookupUnresolved::InvalidIndex {
                    table_index: 5,
                    table_len: 2
                }),
                AccountAddress::Unresolved(LookupUnresolved::FetchFailed),
                AccountAddress::Unresolved(LookupUnresolved::Fetching),
                AccountAddress::Unresolved(LookupUnresolved::NotFetched),
            ]
        );
    }

    #[test]
    fn locked_cache_reads_as_fetching() {
        let table_key = Address::new([220; 32]);
        let cache = RwLock::new(HashMap::from([(table_key, table(0, 1))]));
        let msg = message(
            header(1, 0, 0),
            1,
            vec![AddressTableLookup {
                account_key: table_key,
                writable_indexes: Vec::new(),
                readonly_indexes: vec![0],
            }],
        );
        assert_eq!(
            resolve(&msg, &cache).unwrap()[1].address,
            AccountAddress::Known(key(0))
        );

        let _writer = cache.write().unwrap();
        assert_eq!(
            resolve(&msg, &cache).unwrap()[1].address,
            AccountAddress::Unresolved(LookupUnresolved::Fetching)
        );
    }

    #[test]
    fn header_rejections() {
        assert_eq!(
            resolve(&message(header(1, 0, 0), 0, Vec::new()), &NoLookupTables),
            Err(AccountResolutionError::NoStaticAccounts)
        );
        assert_eq!(
            resolve(&message(header(1, 1, 0), 3, Vec::new()), &NoLookupTables),
            Err(AccountResolutionError::ReadonlySignersExceedSigners {
                readonly_signed: 1,
                required: 1
            })
        );
        assert_eq!(
            resolve(&message(header(0, 0, 0), 3, Vec::new()), &NoLookupTables),
            Err(AccountResolutionError::ReadonlySignersExceedSigners {
                readonly_signed: 0,
                required: 0
            })
        );
        assert_eq!(
            resolve(&message(header(1, 0, 3), 3, Vec::new()), &NoLookupTables),
            Err(AccountResolutionError::ReadonlyUnsignedExceedAccounts {
                readonly_unsigned: 3,
                total: 3
            })
        );
        assert_eq!(
            resolve(&message(header(4, 0, 0), 3, Vec::new()), &NoLookupTables),
            Err(AccountResolutionError::SignersExceedAccounts {
                required: 4,
                total: 3
            })
        );
    }

    #[test]
    fn ordering_and_length_hold_for_randomized_messages() {
        let mut seed = 0x5EED_u64;
        for _ in 0..2_000 {
            let keys = 1 + (lcg_next(&mut seed) % 20) as usize;
            let required = 1 + (lcg_next(&mut seed) % keys as u64) as u8;
            let readonly_signed = (lcg_next(&mut seed) % u64::from(required)) as u8;
            let unsigned = keys - usize::from(required);
            let readonly_unsigned = if unsigned == 0 {
                0
            } else {
                (lcg_next(&mut seed) % (unsigned as u64 + 1)) as u8
            };
            let readonly_unsigned = readonly_unsigned.min((keys - 1) as u8);

            let lookups: Vec<AddressTableLookup> = (0..lcg_next(&mut seed) % 3)
                .map(|n| AddressTableLookup {
                    account_key: Address::new([240 + n as u8; 32]),
                    writable_indexes: (0..lcg_next(&mut seed) % 4).map(|i| i as u8).collect(),
                    readonly_indexes: (0..lcg_next(&mut seed) % 4).map(|i| i as u8 + 4).collect(),
                })
                .collect();
            let tables: HashMap<Address, FetchStatus> = lookups
                .iter()
                .map(|l| (l.account_key, table(50, 8)))
                .collect();
            let msg = message(
                header(required, readonly_signed, readonly_unsigned),
                keys,
                lookups,
            );

            let resolved = resolve(&msg, &tables).unwrap();
            let expected_len = keys
                + msg
                    .address_table_lookups
                    .iter()
                    .map(|l| l.writable_indexes.len() + l.readonly_indexes.len())
                    .sum::<usize>();
            assert_eq!(resolved.len(), expected_len);

            // Rank each account by its ordering class; ranks must never decrease.
            let rank = |a: &ResolvedAccount| match (a.source, a.is_signer, a.is_writable) {
                (AccountSource::Static, true, true) => 0,
                (AccountSource::Static, true, false) => 1,
                (AccountSource::Static, false, true) => 2,
                (AccountSource::Static, false, false) => 3,
                (AccountSource::Lookup { .. }, _, true) => 4,
                (AccountSource::Lookup { .. }, _, false) => 5,
            };
            let ranks: Vec<u8> = resolved.iter().map(rank).collect();
            assert!(
                ranks.windows(2).all(|w| w[0] <= w[1]),
                "ordering violated: {ranks:?}"
            );
            assert!(resolved.iter().enumerate().all(|(i, a)| a.index == i));
        }
    }

    #[test]
    fn raw_instruction_maps_indexes_and_flags() {
        let msg = message(header(1, 0, 1), 3, Vec::new());
        let resolved = resolve(&msg, &NoLookupTables).unwrap();
        let compiled = CompiledInstruction {
            program_id_index: 2,
            accounts: vec![0, 1, 9],
            data: vec![1, 2],
            stack_height: None,
        };
        let raw = raw_instruction(&compiled, &resolved).unwrap();
        assert_eq!(raw.program_id, key(2));
        assert_eq!(raw.account_keys[0], AccountRef::new(key(0), true, true));
        assert_eq!(raw.account_keys[1], AccountRef::new(key(1), false, true));
        assert_eq!(
            raw.account_keys[2].address,
            AccountAddress::Unresolved(LookupUnresolved::AccountIndexOutOfRange {
                index: 9,
                total: 3
            })
        );

        let bad_program = CompiledInstruction {
            program_id_index: 7,
            ..compiled
        };
        assert!(raw_instruction(&bad_program, &resolved).is_err());
    }
}
