//! Quiz topic data

#[derive(Debug, Clone)]
pub struct Question {
    pub prompt: &'static str,
    pub options: Vec<&'static str>,
    pub correct: usize,
}

#[derive(Debug, Clone)]
pub struct Topic {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub xp_reward: u64,
    pub questions: Vec<Question>,
}

/// All quiz topics.
pub fn topics() -> Vec<Topic> {
    vec![
        Topic {
            id: "ephemeral-rollups",
            title: "Ephemeral Rollups",
            description: "App-specific, real-time execution environments on Solana.",
            xp_reward: 50,
            questions: vec![
                Question {
                    prompt: "What are Ephemeral Rollups?",
                    options: vec![
                        "Permanent L2 chains",
                        "App-specific runtimes that spin up on demand",
                        "Solana validator nodes",
                        "A type of NFT",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "Where do Ephemeral Rollups settle?",
                    options: vec!["Ethereum", "Solana mainnet", "Bitcoin", "Polygon"],
                    correct: 1,
                },
                Question {
                    prompt: "Primary use case for Ephemeral Rollups?",
                    options: vec![
                        "DeFi trading",
                        "On-chain gaming and real-time apps",
                        "Token launches",
                        "NFT minting",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "Ephemeral Rollups are designed to be:",
                    options: vec![
                        "Slow but secure",
                        "Fast and customizable",
                        "Decentralized and immutable",
                        "Expensive but reliable",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "How do Ephemeral Rollups handle state?",
                    options: vec![
                        "Stored permanently on L2",
                        "Delegated from Solana and returned after execution",
                        "Stored off-chain",
                        "Discarded after each block",
                    ],
                    correct: 1,
                },
            ],
        },
        Topic {
            id: "bolt-ecs",
            title: "BOLT ECS",
            description: "Entity Component System framework for on-chain games.",
            xp_reward: 50,
            questions: vec![
                Question {
                    prompt: "What does ECS stand for?",
                    options: vec![
                        "Encrypted Chain System",
                        "Entity Component System",
                        "Execution Control Service",
                        "External Code Standard",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "BOLT ECS is primarily used for building:",
                    options: vec![
                        "DeFi protocols",
                        "Token bridges",
                        "On-chain games",
                        "Wallet apps",
                    ],
                    correct: 2,
                },
                Question {
                    prompt: "What is an 'Entity' in ECS?",
                    options: vec![
                        "A smart contract",
                        "A unique identifier that groups components",
                        "A blockchain transaction",
                        "A type of account",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "What is a 'Component' in ECS?",
                    options: vec![
                        "A visual UI element",
                        "A data container attached to entities",
                        "A network protocol",
                        "A blockchain node",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "What is a 'System' in ECS?",
                    options: vec![
                        "The blockchain network",
                        "Logic that operates on entities with specific components",
                        "A hardware requirement",
                        "A deployment tool",
                    ],
                    correct: 1,
                },
            ],
        },
        Topic {
            id: "session-keys",
            title: "Session Keys",
            description: "Seamless UX with delegated transaction signing.",
            xp_reward: 50,
            questions: vec![
                Question {
                    prompt: "What problem do Session Keys solve?",
                    options: vec![
                        "High gas fees",
                        "Repeated wallet popup approvals",
                        "Slow block times",
                        "Token inflation",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "Session Keys allow users to:",
                    options: vec![
                        "Mine tokens",
                        "Sign once and interact without further approvals",
                        "Create new wallets",
                        "Transfer NFTs automatically",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "Session Keys are particularly useful for:",
                    options: vec![
                        "Long-term staking",
                        "Real-time gaming interactions",
                        "Token launches",
                        "Governance voting",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "How are Session Keys scoped?",
                    options: vec![
                        "Unlimited permissions forever",
                        "Time-bound and permission-limited",
                        "Only work on testnet",
                        "Require hardware wallets",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "Which SDK integrates Session Keys?",
                    options: vec!["React SDK", "Unity SDK", "Python SDK", "Rust SDK"],
                    correct: 1,
                },
            ],
        },
        Topic {
            id: "tokenomics",
            title: "Tokenomics",
            description: "Understanding the MagicBlock token economy.",
            xp_reward: 50,
            questions: vec![
                Question {
                    prompt: "What blockchain does MagicBlock build on?",
                    options: vec!["Ethereum", "Solana", "Avalanche", "Cardano"],
                    correct: 1,
                },
                Question {
                    prompt: "MagicBlock is classified as a:",
                    options: vec![
                        "Layer 1",
                        "Layer 2 / execution layer",
                        "Sidechain",
                        "Bridge protocol",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "Primary target market for MagicBlock?",
                    options: vec![
                        "DeFi lending",
                        "On-chain gaming and real-time apps",
                        "Supply chain",
                        "Social media",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "How does MagicBlock achieve high throughput?",
                    options: vec![
                        "Larger block sizes",
                        "App-specific Ephemeral Rollups",
                        "Proof of Work",
                        "Centralized servers",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "MagicBlock benefits game developers by:",
                    options: vec![
                        "Providing free hosting",
                        "Enabling fully on-chain game logic with low latency",
                        "Removing need for code",
                        "Fiat payment processing",
                    ],
                    correct: 1,
                },
            ],
        },
        Topic {
            id: "tee",
            title: "TEE (Trusted Execution)",
            description: "Hardware-backed security for private computation.",
            xp_reward: 50,
            questions: vec![
                Question {
                    prompt: "What does TEE stand for?",
                    options: vec![
                        "Token Exchange Engine",
                        "Trusted Execution Environment",
                        "Transaction Encryption Extension",
                        "Total Energy Efficiency",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "TEEs provide security through:",
                    options: vec![
                        "Software encryption only",
                        "Hardware-isolated execution",
                        "Social verification",
                        "Multi-signature wallets",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "In gaming, TEEs can be used for:",
                    options: vec![
                        "Rendering graphics",
                        "Hiding game state (fog of war)",
                        "Storing NFT artwork",
                        "Managing discord servers",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "TEEs ensure that:",
                    options: vec![
                        "All data is public",
                        "Computation is verifiable even when inputs are private",
                        "Transactions are free",
                        "Blocks are faster",
                    ],
                    correct: 1,
                },
                Question {
                    prompt: "Which is a real-world TEE technology?",
                    options: vec!["Intel SGX", "SQLite", "React Native", "MongoDB"],
                    correct: 0,
                },
            ],
        },
    ]
}
