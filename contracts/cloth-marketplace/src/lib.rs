/*!
 * Cloth Marketplace Smart Contract
 *
 * A decentralized storefront where wallet holders list garments for sale,
 * browse other sellers' inventory, and settle purchases through an internal
 * escrow ledger. The contract combines two halves:
 *
 * - An escrow ledger: per-account balances backed 1:1 by a custodied token.
 *   Funds enter through `deposit`, leave through `withdraw`, and move between
 *   accounts through `transfer` and purchase settlement.
 * - A marketplace: listings with a monotonic id, a per-account holdings table,
 *   and a registry of every account that has ever listed.
 *
 * Invariants:
 * - The sum of all ledger balances equals the token amount the contract
 *   custodies through deposits and withdrawals (tracked as a running total).
 * - Every operation validates its guards before touching state; a failed call
 *   never leaves a partial mutation behind.
 * - Purchase settlement moves funds and inventory in one invocation, so the
 *   four mutations (debit buyer, credit seller, decrement seller holding,
 *   increment buyer holding) are all-or-nothing.
 */

#![no_std]

mod types;


use soroban_sdk::{
    contract, contractimpl, log, token, Address, Env, Map, String, Symbol, Vec,
    symbol_short,
};

use types::{Cloth, Error, OwnedCloth, CLOTH_ADDED, CLOTH_SOLD, DEPOSIT, TRANSFER, WITHDRAW};

#[contract]
pub struct ClothMarketplace;

// Storage keys - short symbols keep the footprint small.
// Persistent storage holds configuration set once at initialization;
// instance storage holds the runtime ledger and marketplace data.
const ADMIN_KEY: Symbol = symbol_short!("ADMIN"); // Operator address (persistent)
const TOKEN_KEY: Symbol = symbol_short!("TOKEN"); // Custodied token contract (persistent)
const BALANCES_KEY: Symbol = symbol_short!("BALANCES"); // Map of account -> ledger balance (instance)
const TOTAL_BAL_KEY: Symbol = symbol_short!("TOTAL_BAL"); // Running sum of all ledger balances (instance)
const CLOTHES_KEY: Symbol = symbol_short!("CLOTHES"); // Map of listing id -> Cloth (instance)
const HOLDINGS_KEY: Symbol = symbol_short!("HOLDINGS"); // Map of (account, id) -> quantity held (instance)
const CUSTOMERS_KEY: Symbol = symbol_short!("CUSTOMERS"); // Append-only list of seller addresses (instance)
const NEXT_CLOTH_ID: Symbol = symbol_short!("NEXT_C_ID"); // Counter for unique listing ids (instance)

#[contractimpl]
impl ClothMarketplace {
    /// Initializes the marketplace with its operator and the token it custodies.
    /// Can only be called once.
    ///
    /// # Arguments
    /// * `admin` - The operator address recorded at deployment
    /// * `token_id` - The contract address of the token backing the ledger
    ///
    /// # Panics
    /// If the contract has already been initialized, or if `token_id` does not
    /// implement the token interface (checked by calling `decimals()`).
    pub fn initialize(env: Env, admin: Address, token_id: Address) {
        if env.storage().persistent().has(&ADMIN_KEY) {
            panic!("Contract already initialized");
        }

        // Validate the token address actually points at a token contract.
        // This panics early instead of failing on the first deposit.
        let token_client = token::Client::new(&env, &token_id);
        let _ = token_client.decimals();

        env.storage().persistent().set(&ADMIN_KEY, &admin);
        env.storage().persistent().set(&TOKEN_KEY, &token_id);

        env.storage().instance().set(&BALANCES_KEY, &Map::<Address, i128>::new(&env));
        env.storage().instance().set(&TOTAL_BAL_KEY, &0i128);
        env.storage().instance().set(&CLOTHES_KEY, &Map::<u64, Cloth>::new(&env));
        env.storage().instance().set(&HOLDINGS_KEY, &Map::<(Address, u64), u32>::new(&env));
        env.storage().instance().set(&CUSTOMERS_KEY, &Vec::<Address>::new(&env));
        env.storage().instance().set(&NEXT_CLOTH_ID, &0u64);
    }

    // ================================================================================================
    // LEDGER OPERATIONS
    // ================================================================================================
    // The escrow half: balances are backed 1:1 by the custodied token. Value
    // only crosses the contract boundary in `deposit` and `withdraw`; every
    // other movement is internal bookkeeping.

    /// Credits the caller's ledger balance by moving tokens into the contract.
    ///
    /// This is the only path by which value enters the ledger: the platform
    /// has no bare value-transfer entry point, so anything an account wants
    /// credited must come through here.
    ///
    /// # Arguments
    /// * `from` - The account depositing (must sign the transaction)
    /// * `amount` - Token amount to custody, in the token's smallest unit
    ///
    /// # Errors
    /// - `InvalidAmount`: amount is zero or negative
    /// - `TokenTransferFailed`: the token contract rejected the transfer;
    ///   no ledger state was touched
    pub fn deposit(env: Env, from: Address, amount: i128) -> Result<(), Error> {
        from.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        // Custody the tokens before crediting the ledger. If this fails the
        // call returns with no state change at all.
        let token_id: Address = env.storage().persistent().get(&TOKEN_KEY).unwrap();
        let token_client = token::Client::new(&env, &token_id);
        match token_client.try_transfer(&from, &env.current_contract_address(), &amount) {
            Ok(_) => {}
            Err(_) => {
                log!(&env, "Deposit transfer of {} failed", amount);
                return Err(Error::TokenTransferFailed);
            }
        }

        let mut balances: Map<Address, i128> = env.storage().instance().get(&BALANCES_KEY).unwrap();
        let credited = balances.get(from.clone()).unwrap_or(0) + amount;
        balances.set(from.clone(), credited);

        let total: i128 = env.storage().instance().get(&TOTAL_BAL_KEY).unwrap();
        env.storage().instance().set(&BALANCES_KEY, &balances);
        env.storage().instance().set(&TOTAL_BAL_KEY, &(total + amount));

        env.events().publish((DEPOSIT, from), amount);

        Ok(())
    }

    /// Releases tokens from the caller's ledger balance back to their wallet.
    ///
    /// Follows checks-effects-interactions: the balance is debited before the
    /// outbound token transfer, so no reentrant call can observe the old
    /// balance between the check and the debit. A failed transfer restores
    /// the debit and reports `TokenTransferFailed`.
    ///
    /// # Arguments
    /// * `to` - The account withdrawing (must sign the transaction)
    /// * `amount` - Token amount to release
    ///
    /// # Errors
    /// - `InvalidAmount`: amount is zero or negative
    /// - `InsufficientFunds`: ledger balance is below `amount`
    /// - `TokenTransferFailed`: the outbound transfer failed; the balance is
    ///   left exactly as it was before the call
    pub fn withdraw(env: Env, to: Address, amount: i128) -> Result<(), Error> {
        to.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let mut balances: Map<Address, i128> = env.storage().instance().get(&BALANCES_KEY).unwrap();
        let held = balances.get(to.clone()).unwrap_or(0);
        if held < amount {
            return Err(Error::InsufficientFunds);
        }

        // Debit first, transfer second.
        balances.set(to.clone(), held - amount);
        let total: i128 = env.storage().instance().get(&TOTAL_BAL_KEY).unwrap();
        env.storage().instance().set(&BALANCES_KEY, &balances);
        env.storage().instance().set(&TOTAL_BAL_KEY, &(total - amount));

        let token_id: Address = env.storage().persistent().get(&TOKEN_KEY).unwrap();
        let token_client = token::Client::new(&env, &token_id);
        match token_client.try_transfer(&env.current_contract_address(), &to, &amount) {
            Ok(_) => {}
            Err(_) => {
                log!(&env, "Withdraw transfer of {} failed", amount);
                // Restore the debit so the failed call leaves no trace.
                balances.set(to.clone(), held);
                env.storage().instance().set(&BALANCES_KEY, &balances);
                env.storage().instance().set(&TOTAL_BAL_KEY, &total);
                return Err(Error::TokenTransferFailed);
            }
        }

        env.events().publish((WITHDRAW, to), amount);

        Ok(())
    }

    /// Moves funds between two ledger balances without any token movement.
    ///
    /// Transferring to yourself is permitted; the debit and credit cancel out
    /// and the call succeeds with no net effect.
    ///
    /// # Arguments
    /// * `from` - The paying account (must sign the transaction)
    /// * `to` - The receiving account; a balance entry is created if absent
    /// * `amount` - Amount to move
    ///
    /// # Errors
    /// - `InvalidAmount`: amount is zero or negative
    /// - `InsufficientFunds`: `from`'s balance is below `amount`
    pub fn transfer(env: Env, from: Address, to: Address, amount: i128) -> Result<(), Error> {
        from.require_auth();

        if amount <= 0 {
            return Err(Error::InvalidAmount);
        }

        let mut balances: Map<Address, i128> = env.storage().instance().get(&BALANCES_KEY).unwrap();
        let from_held = balances.get(from.clone()).unwrap_or(0);
        if from_held < amount {
            return Err(Error::InsufficientFunds);
        }

        // Debit before credit so a self-transfer nets out to a no-op.
        balances.set(from.clone(), from_held - amount);
        let to_held = balances.get(to.clone()).unwrap_or(0);
        balances.set(to.clone(), to_held + amount);
        env.storage().instance().set(&BALANCES_KEY, &balances);

        env.events().publish((TRANSFER, from), (to, amount));

        Ok(())
    }

    /// Returns the ledger balance of an account. Accounts that have never
    /// deposited or received funds read as zero.
    pub fn balance(env: Env, account: Address) -> i128 {
        let balances: Map<Address, i128> = env.storage().instance().get(&BALANCES_KEY).unwrap();
        balances.get(account).unwrap_or(0)
    }

    /// Returns the sum of all tracked ledger balances.
    ///
    /// Maintained as a running total on every deposit and withdrawal, so this
    /// equals both the sum of individual `balance` values and the token amount
    /// the contract custodies on behalf of the ledger.
    pub fn get_total_balance(env: Env) -> i128 {
        env.storage().instance().get(&TOTAL_BAL_KEY).unwrap()
    }

    // ================================================================================================
    // MARKETPLACE OPERATIONS
    // ================================================================================================

    /// Creates a new cloth listing owned by `owner`.
    ///
    /// Assigns the next id from the monotonic counter, records the listing,
    /// seeds the owner's holding with the initial quantity, and registers the
    /// owner in the customer registry if this is their first listing.
    ///
    /// # Arguments
    /// * `name` - Display name for the listing
    /// * `price` - Unit price in the custodied token's smallest unit
    /// * `quantity` - Initial units for sale
    /// * `owner` - The selling account (must sign the transaction)
    ///
    /// # Returns
    /// The id assigned to the new listing.
    ///
    /// # Errors
    /// - `InvalidPrice`: price is zero or negative
    /// - `InvalidQuantity`: quantity is zero
    pub fn add_cloth(
        env: Env,
        name: String,
        price: i128,
        quantity: u32,
        owner: Address,
    ) -> Result<u64, Error> {
        owner.require_auth();

        if price <= 0 {
            return Err(Error::InvalidPrice);
        }
        if quantity == 0 {
            return Err(Error::InvalidQuantity);
        }

        let cloth_id: u64 = env.storage().instance().get(&NEXT_CLOTH_ID).unwrap();

        let mut clothes: Map<u64, Cloth> = env.storage().instance().get(&CLOTHES_KEY).unwrap();
        clothes.set(
            cloth_id,
            Cloth {
                id: cloth_id,
                name,
                price,
                owner: owner.clone(),
            },
        );

        let mut holdings: Map<(Address, u64), u32> =
            env.storage().instance().get(&HOLDINGS_KEY).unwrap();
        holdings.set((owner.clone(), cloth_id), quantity);

        // Register first-time sellers; the registry is append-only.
        let mut customers: Vec<Address> = env.storage().instance().get(&CUSTOMERS_KEY).unwrap();
        if !customers.contains(&owner) {
            customers.push_back(owner.clone());
        }

        env.storage().instance().set(&CLOTHES_KEY, &clothes);
        env.storage().instance().set(&HOLDINGS_KEY, &holdings);
        env.storage().instance().set(&CUSTOMERS_KEY, &customers);
        env.storage().instance().set(&NEXT_CLOTH_ID, &(cloth_id + 1));

        env.events().publish((CLOTH_ADDED, owner), (cloth_id, price, quantity));

        Ok(cloth_id)
    }

    /// Returns the listings an account currently holds units of, ordered by
    /// listing id, each joined with the held quantity.
    ///
    /// Zero-quantity entries are filtered out: a sold-out listing disappears
    /// from its seller's inventory view, and a purchased listing appears in
    /// the buyer's. The listing records themselves are never deleted.
    pub fn get_cloths_by_owner(env: Env, owner: Address) -> Vec<OwnedCloth> {
        let clothes: Map<u64, Cloth> = env.storage().instance().get(&CLOTHES_KEY).unwrap();
        let holdings: Map<(Address, u64), u32> =
            env.storage().instance().get(&HOLDINGS_KEY).unwrap();

        // Map iteration is key-ordered, so results come back in id order.
        let mut owned = Vec::new(&env);
        for (id, cloth) in clothes.iter() {
            let quantity = holdings.get((owner.clone(), id)).unwrap_or(0);
            if quantity > 0 {
                owned.push_back(OwnedCloth {
                    id,
                    name: cloth.name,
                    price: cloth.price,
                    quantity,
                });
            }
        }
        owned
    }

    /// Returns every account that has ever created a listing, in the order
    /// they first listed.
    pub fn get_customers(env: Env) -> Vec<Address> {
        env.storage().instance().get(&CUSTOMERS_KEY).unwrap()
    }

    /// Buys `quantity` units of a listing from `seller`, settling funds and
    /// inventory in one step.
    ///
    /// All guards run before any mutation. Once they pass, four writes happen
    /// together within this single invocation: the buyer's ledger balance is
    /// debited by `price * quantity`, the seller's is credited by the same,
    /// the seller's holding is decremented, and the buyer's holding is
    /// incremented. There are no external calls between the writes, so the
    /// settlement is all-or-nothing.
    ///
    /// # Arguments
    /// * `buyer` - The purchasing account (must sign the transaction)
    /// * `seller` - The account whose holding is being bought from
    /// * `cloth_id` - The listing to buy
    /// * `quantity` - Units to buy
    ///
    /// # Errors
    /// - `SelfPurchase`: buyer and seller are the same account
    /// - `InvalidQuantity`: quantity is zero, or the purchase total overflows
    /// - `ClothNotFound`: no listing exists with `cloth_id`
    /// - `InsufficientInventory`: seller holds fewer than `quantity` units
    /// - `InsufficientFunds`: buyer's ledger balance is below the total
    pub fn buy_cloth(
        env: Env,
        buyer: Address,
        seller: Address,
        cloth_id: u64,
        quantity: u32,
    ) -> Result<(), Error> {
        buyer.require_auth();

        if buyer == seller {
            return Err(Error::SelfPurchase);
        }
        if quantity == 0 {
            return Err(Error::InvalidQuantity);
        }

        let clothes: Map<u64, Cloth> = env.storage().instance().get(&CLOTHES_KEY).unwrap();
        let cloth = clothes.get(cloth_id).ok_or(Error::ClothNotFound)?;

        let mut holdings: Map<(Address, u64), u32> =
            env.storage().instance().get(&HOLDINGS_KEY).unwrap();
        let seller_held = holdings.get((seller.clone(), cloth_id)).unwrap_or(0);
        if seller_held < quantity {
            log!(&env, "Seller holds {} of listing {}, wanted {}", seller_held, cloth_id, quantity);
            return Err(Error::InsufficientInventory);
        }

        let total = cloth
            .price
            .checked_mul(quantity as i128)
            .ok_or(Error::InvalidQuantity)?;

        let mut balances: Map<Address, i128> = env.storage().instance().get(&BALANCES_KEY).unwrap();
        let buyer_funds = balances.get(buyer.clone()).unwrap_or(0);
        if buyer_funds < total {
            log!(&env, "Buyer has {} on the ledger, purchase costs {}", buyer_funds, total);
            return Err(Error::InsufficientFunds);
        }

        // Guards done. Settle funds and inventory together.
        balances.set(buyer.clone(), buyer_funds - total);
        let seller_funds = balances.get(seller.clone()).unwrap_or(0);
        balances.set(seller.clone(), seller_funds + total);

        holdings.set((seller.clone(), cloth_id), seller_held - quantity);
        let buyer_held = holdings.get((buyer.clone(), cloth_id)).unwrap_or(0);
        holdings.set((buyer.clone(), cloth_id), buyer_held + quantity);

        env.storage().instance().set(&BALANCES_KEY, &balances);
        env.storage().instance().set(&HOLDINGS_KEY, &holdings);

        env.events().publish((CLOTH_SOLD, buyer), (seller, cloth_id, quantity, total));

        Ok(())
    }

    // ================================================================================================
    // QUERY FUNCTIONS (GETTERS)
    // ================================================================================================

    /// Returns the operator address recorded at initialization.
    pub fn get_admin(env: Env) -> Address {
        env.storage().persistent().get(&ADMIN_KEY).unwrap()
    }

    /// Returns the contract address of the custodied token.
    pub fn get_token(env: Env) -> Address {
        env.storage().persistent().get(&TOKEN_KEY).unwrap()
    }

    /// Returns a listing record by id, if one exists.
    pub fn get_cloth(env: Env, cloth_id: u64) -> Option<Cloth> {
        let clothes: Map<u64, Cloth> = env.storage().instance().get(&CLOTHES_KEY).unwrap();
        clothes.get(cloth_id)
    }

    /// Returns how many units of a listing an account holds. Accounts with no
    /// entry read as zero.
    pub fn get_holding(env: Env, account: Address, cloth_id: u64) -> u32 {
        let holdings: Map<(Address, u64), u32> =
            env.storage().instance().get(&HOLDINGS_KEY).unwrap();
        holdings.get((account, cloth_id)).unwrap_or(0)
    }

    /// Returns the id the next listing will be assigned.
    pub fn get_next_cloth_id(env: Env) -> u64 {
        env.storage().instance().get(&NEXT_CLOTH_ID).unwrap()
    }
}
