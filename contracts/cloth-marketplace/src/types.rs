/*!
 * Type definitions for the Cloth Marketplace contract.
 *
 * Everything that crosses the contract boundary lives here: the listing
 * records, the error taxonomy shared by the ledger and marketplace halves,
 * and the event topic symbols used for off-chain indexing.
 */

use soroban_sdk::{contracterror, contracttype, symbol_short, Address, String, Symbol};

// ================================================================================================
// CORE DATA STRUCTURES
// ================================================================================================

/// A cloth listing created by a seller.
///
/// The listing record itself is immutable once created: the id comes from a
/// monotonic counter and is never reused, and the record is never deleted.
/// How many units an account currently holds is tracked separately in the
/// holdings mapping, so a listing persists even after it sells out.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Cloth {
    /// Unique listing id, assigned from the contract's monotonic counter
    pub id: u64,

    /// Display name chosen by the seller
    pub name: String,

    /// Unit price in the smallest unit of the custodied token.
    /// Always positive; enforced at creation
    pub price: i128,

    /// The account that created the listing
    pub owner: Address,
}

/// A listing joined with the quantity a particular account holds.
///
/// This is the row shape returned by `get_cloths_by_owner`: the presenting
/// application needs the price and name next to the held quantity to render
/// an inventory panel, so the contract does the join rather than forcing
/// clients into N+1 lookups.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OwnedCloth {
    pub id: u64,
    pub name: String,
    pub price: i128,
    /// Units of this listing currently held by the queried account (> 0)
    pub quantity: u32,
}

// ================================================================================================
// ERROR DEFINITIONS
// ================================================================================================

/// Failure taxonomy for all ledger and marketplace operations.
///
/// Every error is rejected guard-clause style at the start of the operation,
/// before any state mutation, so a failed call never leaves partial writes
/// behind. Numeric codes are stable for client-side matching.
#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    /// Listing price must be greater than zero
    InvalidPrice = 1,

    /// Quantity must be greater than zero; also raised when a purchase
    /// total would overflow the ledger's amount type
    InvalidQuantity = 2,

    /// Caller's ledger balance does not cover the requested amount
    InsufficientFunds = 3,

    /// Seller does not hold enough units of the listing to sell
    InsufficientInventory = 4,

    /// Buying from yourself is not allowed
    SelfPurchase = 5,

    /// Deposit/withdraw/transfer amount must be greater than zero
    InvalidAmount = 6,

    /// No listing exists with the requested id
    ClothNotFound = 7,

    /// The custodied token rejected a transfer; ledger state is left as it
    /// was before the call
    TokenTransferFailed = 8,
}

// ================================================================================================
// EVENT CONSTANTS
// ================================================================================================
// Topic symbols for the events published by each state-mutating operation.
// Off-chain indexers key on these to follow marketplace activity.

/// Funds credited to a ledger balance: topics (DEPOSIT, account), data (amount)
pub const DEPOSIT: Symbol = symbol_short!("deposit");

/// Funds released back to an account: topics (WITHDRAW, account), data (amount)
pub const WITHDRAW: Symbol = symbol_short!("withdraw");

/// Internal ledger transfer: topics (TRANSFER, from), data (to, amount)
pub const TRANSFER: Symbol = symbol_short!("transfer");

/// New listing created: topics (CLOTH_ADDED, owner), data (id, price, quantity)
pub const CLOTH_ADDED: Symbol = symbol_short!("cloth_add");

/// Purchase settled: topics (CLOTH_SOLD, buyer), data (seller, id, quantity, total)
pub const CLOTH_SOLD: Symbol = symbol_short!("cloth_buy");
