use snare_ir::types::TrapDefinition;

/// A ready-made trap definition watching a live mainnet contract.
#[derive(Debug, Clone, Copy)]
pub struct TrapPreset {
    pub label: &'static str,
    pub collector_source: &'static str,
    pub predicate_source: &'static str,
}

impl TrapPreset {
    pub fn definition(&self) -> TrapDefinition {
        TrapDefinition::new(self.label, self.collector_source, self.predicate_source)
    }
}

/// A predicate paired with a hand-written sample state, for snapshot
/// evaluation without any provider.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotPreset {
    pub label: &'static str,
    pub predicate_source: &'static str,
    /// JSON object literal, the state the predicate is meant to see.
    pub sample_state: &'static str,
}

pub fn presets() -> &'static [TrapPreset] {
    PRESETS
}

pub fn snapshot_presets() -> &'static [SnapshotPreset] {
    SNAPSHOT_PRESETS
}

const PRESETS: &[TrapPreset] = &[
    TrapPreset {
        label: "Low ETH Balance Alert",
        collector_source: r#"{
    "collect": {
        "ethBalance": ["scale",
            ["call", "eth_getBalance", ["0x00000000219ab540356cBB839Cbe05303d7705Fa", "latest"]],
            18],
        "timestamp": ["now"]
    }
}"#,
        predicate_source: r#"{"should_respond": ["lt", ["field", "ethBalance"], 10]}"#,
    },
    TrapPreset {
        label: "High ETH Balance Alert",
        collector_source: r#"{
    "collect": {
        "ethBalance": ["scale",
            ["call", "eth_getBalance", ["0x00000000219ab540356cBB839Cbe05303d7705Fa", "latest"]],
            18],
        "timestamp": ["now"]
    }
}"#,
        predicate_source: r#"{"should_respond": ["gt", ["field", "ethBalance"], 1000]}"#,
    },
    TrapPreset {
        label: "Chainlink BTC Price Drop",
        collector_source: r#"{
    "collect": {
        "btcPrice": ["scale",
            ["call", "eth_call", [{"to": "0xf4030086522a5beea4988f8ca5b36dbc97bee88c", "data": "0x50d25bcd"}, "latest"]],
            8],
        "timestamp": ["now"]
    }
}"#,
        predicate_source: r#"{"should_respond": ["lt", ["field", "btcPrice"], 20000]}"#,
    },
    TrapPreset {
        label: "Uniswap ETH/USDC Pool TVL Drop",
        collector_source: r#"{
    "collect": {
        "tvlUSD": ["sum",
            ["scale",
                ["word", ["call", "eth_call", [{"to": "0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc", "data": "0x0902f1ac"}, "latest"]], 0],
                6],
            ["scale",
                ["word", ["call", "eth_call", [{"to": "0xB4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc", "data": "0x0902f1ac"}, "latest"]], 1],
                18]]
    }
}"#,
        predicate_source: r#"{"should_respond": ["lt", ["field", "tvlUSD"], 1000000]}"#,
    },
    TrapPreset {
        label: "Lido Staked ETH Slashing Risk",
        collector_source: r#"{
    "collect": {
        "totalStakedETH": ["scale",
            ["call", "eth_call", [{"to": "0xae7ab96520DE3A18E5e111B5EaAb095312D7fE84", "data": "0x37cfdaca"}, "latest"]],
            18],
        "timestamp": ["now"]
    }
}"#,
        predicate_source: r#"{"should_respond": ["lt", ["field", "totalStakedETH"], 4000000]}"#,
    },
    TrapPreset {
        label: "StETH / ETH Peg Analysis",
        collector_source: r#"{
    "collect": {
        "pegRatio": ["scale",
            ["call", "eth_call", [{"to": "0xDC24316b9AE028F1497c275EB9192a3Ea0f67022", "data": "0x5e0d443f000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000000010000000000000000000000000000000000000000000000000de0b6b3a7640000"}, "latest"]],
            18]
    }
}"#,
        predicate_source: r#"{"should_respond": ["or",
    ["lt", ["field", "pegRatio"], 0.98],
    ["gt", ["field", "pegRatio"], 1.02]]}"#,
    },
];

const SNAPSHOT_PRESETS: &[SnapshotPreset] = &[
    SnapshotPreset {
        label: "Oracle Price Drop",
        predicate_source: r#"{"should_respond": ["and",
    ["eq", ["field", "asset"], "BTC"],
    ["lt", ["field", "oraclePrice"], 20000]]}"#,
        sample_state: r#"{
    "type": "oracle",
    "asset": "BTC",
    "oraclePrice": 19500,
    "timestamp": 1787443200000
}"#,
    },
    SnapshotPreset {
        label: "AVS Slashing",
        predicate_source: r#"{"should_respond": ["and",
    ["eq", ["field", "avs"], "staking"],
    ["gt", ["field", "slashAmount"], 5000]]}"#,
        sample_state: r#"{
    "type": "slashing",
    "avs": "staking",
    "slashAmount": 6000,
    "timestamp": 1787443200000
}"#,
    },
    SnapshotPreset {
        label: "DEX Liquidity Drop",
        predicate_source: r#"{"should_respond": ["and",
    ["eq", ["field", "pool"], "DEX-XYZ"],
    ["lt", ["field", "liquidityUSD"], 1000000]]}"#,
        sample_state: r#"{
    "type": "liquidity",
    "pool": "DEX-XYZ",
    "liquidityUSD": 800000,
    "timestamp": 1787443200000
}"#,
    },
    SnapshotPreset {
        // The bare field reference relies on truthiness: a loan id
        // string counts as present, null or "" does not.
        label: "Lending Collateral Event",
        predicate_source: r#"{"should_respond": ["and",
    ["lt", ["field", "collateralRatio"], 1.2],
    ["field", "loanId"]]}"#,
        sample_state: r#"{
    "type": "loan",
    "loanId": "LN-1234",
    "collateralRatio": 1.1,
    "timestamp": 1787443200000
}"#,
    },
];
