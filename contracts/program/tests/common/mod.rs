use otpkit_program::{AuthorizationRequest, Chain, OperationParams, OperationType};
use otpkit_state::{hash_pair, sha256, sha256_concat, Address, Hash, WalletConfig, ZERO_HASH};

pub const INTERVAL: u32 = 30;
/// Even, so slot pairs share a 60 second spending window.
pub const T0: u64 = 56_666_666;
pub const LIFESPAN: u32 = 12;
pub const SLOT_SIZE: u8 = 2;
pub const ONE_ETH: u128 = 1_000_000_000_000_000_000;
pub const HALF_ETH: u128 = ONE_ETH / 2;
pub const ONE_CENT: u128 = ONE_ETH / 100;

pub fn addr(tag: u8) -> Address {
    Address([tag; 20])
}

/// Proof tree with synthetic one-time proofs, laid out like a real one:
/// slot-ordered leaves, the recovery leaf last, zero padding in between.
pub struct TestTree {
    pub tag: u8,
    pub layers: Vec<Vec<Hash>>,
}

impl TestTree {
    pub fn new(tag: u8) -> Self {
        let leaf_count = LIFESPAN as usize * SLOT_SIZE as usize;
        let capacity = (leaf_count + 1).next_power_of_two();
        let mut leaves = vec![ZERO_HASH; capacity];
        for (i, leaf) in leaves.iter_mut().take(leaf_count).enumerate() {
            *leaf = sha256(&Self::proof_for(tag, i as u32));
        }
        leaves[capacity - 1] = sha256(&Self::recovery_proof_for(tag));

        let mut layers = vec![leaves];
        while layers.last().map(|l| l.len()).unwrap_or(0) > 1 {
            let prev = layers.last().unwrap();
            let next = prev.chunks(2).map(|c| hash_pair(&c[0], &c[1])).collect();
            layers.push(next);
        }
        Self { tag, layers }
    }

    fn proof_for(tag: u8, index: u32) -> Hash {
        sha256_concat(&[b"proof", &[tag], &index.to_be_bytes()])
    }

    fn recovery_proof_for(tag: u8) -> Hash {
        sha256_concat(&[b"recovery", &[tag]])
    }

    pub fn root(&self) -> Hash {
        self.layers.last().unwrap()[0]
    }

    pub fn height(&self) -> u8 {
        self.layers.len() as u8
    }

    pub fn recovery_index(&self) -> u32 {
        (self.layers[0].len() - 1) as u32
    }

    pub fn path(&self, index: u32) -> Vec<Hash> {
        let mut i = index as usize;
        let mut path = Vec::new();
        for layer in &self.layers[..self.layers.len() - 1] {
            path.push(layer[i ^ 1]);
            i /= 2;
        }
        path
    }

    pub fn config(&self, last_resort: Address, spending_limit: u128) -> WalletConfig {
        WalletConfig {
            root: self.root(),
            identification_keys: vec![format!("test-wallet-{}", self.tag)],
            inner_cores: vec![],
            height: self.height(),
            interval: INTERVAL,
            t0: T0,
            lifespan: LIFESPAN,
            slot_size: SLOT_SIZE,
            last_resort_address: last_resort,
            spending_limit,
            spending_interval: 60,
        }
    }

    /// Request revealed for `(slot, sub_index)`, timed one second into the slot.
    pub fn request(
        &self,
        operation_type: OperationType,
        dest: Address,
        amount: u128,
        slot: u32,
        sub_index: u8,
    ) -> AuthorizationRequest {
        let index = slot * SLOT_SIZE as u32 + sub_index as u32;
        AuthorizationRequest {
            params: OperationParams::new(operation_type, dest, amount),
            index,
            one_time_proof: Self::proof_for(self.tag, index),
            merkle_path: self.path(index),
            timestamp: slot_time(slot) + 1,
        }
    }

    pub fn recovery_request(&self, timestamp: u64) -> AuthorizationRequest {
        self.recovery_leaf_request(OperationType::Recover, Address::ZERO, timestamp)
    }

    /// FORWARD to `dest`, revealed with the recovery leaf.
    pub fn forward_request(&self, dest: Address, timestamp: u64) -> AuthorizationRequest {
        self.recovery_leaf_request(OperationType::Forward, dest, timestamp)
    }

    fn recovery_leaf_request(
        &self,
        operation_type: OperationType,
        dest: Address,
        timestamp: u64,
    ) -> AuthorizationRequest {
        let index = self.recovery_index();
        AuthorizationRequest {
            params: OperationParams::new(operation_type, dest, 0),
            index,
            one_time_proof: Self::recovery_proof_for(self.tag),
            merkle_path: self.path(index),
            timestamp,
        }
    }
}

pub fn slot_time(slot: u32) -> u64 {
    (T0 + slot as u64) * INTERVAL as u64
}

pub struct TestContext {
    pub chain: Chain,
    pub tree: TestTree,
    pub wallet: Address,
}

pub fn setup_wallet(tag: u8, last_resort: Address, spending_limit: u128, funds: u128) -> TestContext {
    let mut chain = Chain::new(addr(0xde), [0xc0; 32]);
    let tree = TestTree::new(tag);
    let wallet = chain
        .deploy_wallet(tree.config(last_resort, spending_limit), slot_time(0))
        .expect("deploy");
    chain.fund(&wallet, funds);
    TestContext {
        chain,
        tree,
        wallet,
    }
}

/// Wallet holding 0.5 ETH, 1 ETH per-minute limit, recovery address unset.
pub fn setup_test() -> TestContext {
    setup_wallet(1, Address::ZERO, ONE_ETH, HALF_ETH)
}
