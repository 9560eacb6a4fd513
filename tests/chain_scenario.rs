use ledger::core::block::Block;
use ledger::core::blockchain::{Blockchain, ChainError};
use ledger::core::transaction::Transaction;
use ledger::core::validator::{Validator, unix_now};
use ledger::crypto::wallet::Wallet;
use ledger::storage::ordered_store::{OrderedStore, StoreError};
use ledger::types::address::Address;
use ledger::types::encoding::Decode;
use ledger::types::merkle_tree::EMPTY_TX_DIGEST;
use ledger::utils::log::{Level, Logger};

fn quiet_logger() -> Logger {
    Logger::new("scenario").with_min_level(Level::Error)
}

/// Genesis G, then A on G, then C on A.
fn three_blocks() -> (Block, Block, Block) {
    let now = unix_now();
    let g = Block::genesis(now - 2, vec![]);
    let a = Block::child_of(&g, now - 1, vec![]).unwrap();
    let c = Block::child_of(&a, now, vec![]).unwrap();
    (g, a, c)
}

#[test]
fn insert_evict_and_validate() {
    let (g, a, c) = three_blocks();
    let mut chain = Blockchain::in_memory(quiet_logger());
    for b in [&g, &a, &c] {
        chain.insert(b.clone()).unwrap();
    }

    assert!(chain.sanity_check());
    assert_eq!(chain.locate_block(&a.hash.to_hex()), Some(&a));

    chain.evict(&a.hash);
    assert!(!chain.sanity_check());
    assert!(chain.locate_block(&a.hash.to_hex()).is_none());

    let validator = Validator::new(Wallet::generate());
    let address = validator.address();
    chain.validators_mut().add_validator(validator).unwrap();

    assert!(chain.validate_last_block());
    assert_eq!(chain.validators().selected(), Some(address.as_str()));
}

#[test]
fn records_roundtrip_through_rocksdb() {
    let dir = tempfile::tempdir().unwrap();
    let (g, a, _) = three_blocks();
    let tx = Transaction::new(
        unix_now(),
        2,
        Address::from_public_key(b"sender"),
        Address::from_public_key(b"recipient"),
        -25,
    );
    let b = Block::child_of(&a, unix_now(), vec![tx]).unwrap();

    let mut chain = Blockchain::open(dir.path().join("chain"), quiet_logger()).unwrap();
    for block in [&g, &a, &b] {
        chain.insert(block.clone()).unwrap();
    }

    for block in [&g, &a, &b] {
        let raw = chain.store().get(block.hash.as_slice()).unwrap();
        assert_eq!(&Block::from_bytes(&raw).unwrap(), block);
    }
    assert_eq!(g.tx_digest, *EMPTY_TX_DIGEST);
    assert_ne!(b.tx_digest, *EMPTY_TX_DIGEST);
    assert!(g.parent_hash.is_zero());
}

#[test]
fn store_navigation_ignores_chain_order() {
    let (g, a, c) = three_blocks();
    let mut chain = Blockchain::in_memory(quiet_logger());
    for b in [&g, &a, &c] {
        chain.insert(b.clone()).unwrap();
    }

    let mut by_key = vec![g.clone(), a.clone(), c.clone()];
    by_key.sort_by(|x, y| x.hash.as_slice().cmp(y.hash.as_slice()));

    assert_eq!(chain.first().unwrap(), by_key[0]);
    assert_eq!(chain.last().unwrap(), by_key[2]);
    assert_eq!(chain.previous().unwrap(), by_key[1]);
    assert_eq!(chain.tip(), Some(&c));
}

#[test]
fn closed_chain_refuses_inserts() {
    let (g, _, _) = three_blocks();
    let mut chain = Blockchain::in_memory(quiet_logger());
    chain.close();

    assert!(matches!(chain.insert(g), Err(ChainError::InsertFailed(_))));
    assert_eq!(chain.store().last(), Err(StoreError::ClosedStore));
}
