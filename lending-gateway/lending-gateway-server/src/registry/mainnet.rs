//! The Ethereum mainnet asset and gateway tables
//!
//! Gateway order is significant: it defines the route indices returned by
//! quotes and consumed by execution

use alloy_primitives::{address, Address};

use super::{
    assets::{Asset, Platform},
    gateways::{Gateway, GatewayMethod},
};

/// The mainnet chain id
pub const MAINNET_CHAIN_ID: u64 = 1;

// -------------
// | Constants |
// -------------

/// The MakerDAO DSR pot
pub const POT_ADDRESS: Address = address!("0x197E90f9FAD81970bA7976f33CbD77088E5D7cf7");
/// The AAVE v1 lending pool
pub const LENDING_POOL_ADDRESS: Address = address!("0x398eC7346DcD622eDc5ae82352F02bE94C62d119");

/// cSAI
pub const CSAI: Address = address!("0xf5dce57282a584d2746faf1593d3121fcac444dc");
/// cDAI
pub const CDAI: Address = address!("0x5d3a536E4D6DbD6114cc1Ead35777bAB948E3643");
/// cUSDC
pub const CUSDC: Address = address!("0x39aa39c021dfbae8fac545936693ac917d5e7563");
/// cUSDT
pub const CUSDT: Address = address!("0xf650C3d88D12dB855b8bf7D11Be6C55A4e07dCC9");
/// iSAI
pub const ISAI: Address = address!("0x14094949152eddbfcd073717200da82fed8dc960");
/// CHAI
pub const CHAI: Address = address!("0x06AF07097C9Eeb7fD685c692751D5C66dB49c215");
/// aDAI
pub const ADAI: Address = address!("0xfC1E690f61EFd961294b3e1Ce3313fBD8aa4f85d");
/// aUSDT
pub const AUSDT: Address = address!("0x71fc860F7D3A592A4a98740e39dB31d25db65ae8");

/// DAI, the aDAI lending pool reserve
const DAI: Address = address!("0x6B175474E89094C44Da98b954EedeAC495271d0F");
/// USDT, the aUSDT lending pool reserve
const USDT: Address = address!("0xdAC17F958D2ee523a2206206994597C13D831ec7");

/// The gas ceilings of the three referral routing methods
const REFERRAL_GAS_LIMITS: [u64; 3] = [300_000, 475_000, 825_000];

// ----------
// | Tables |
// ----------

/// The mainnet assets
pub fn assets() -> Vec<Asset> {
    vec![
        asset(CSAI, "cSAI", Platform::Compound, 8, "SAI", 18, None, 7_710_752),
        asset(CDAI, "cDAI", Platform::Compound, 8, "DAI", 18, None, 8_983_575),
        asset(CUSDC, "cUSDC", Platform::Compound, 8, "USDC", 6, None, 7_710_760),
        asset(CUSDT, "cUSDT", Platform::Compound, 8, "USDT", 6, None, 9_879_363),
        asset(ISAI, "iSAI", Platform::Fulcrum, 18, "SAI", 18, None, 7_867_896),
        asset(CHAI, "CHAI", Platform::MakerDao, 18, "DAI", 18, None, 8_928_160),
        asset(ADAI, "aDAI", Platform::Aave, 18, "DAI", 18, Some(DAI), 9_241_063),
        asset(AUSDT, "aUSDT", Platform::Aave, 6, "USDT", 6, Some(USDT), 9_241_063),
    ]
}

/// The mainnet gateways, in route order per asset
#[rustfmt::skip]
pub fn gateways() -> Vec<Gateway> {
    let plain = |address, target, method, gas| {
        Gateway::plain(MAINNET_CHAIN_ID, address, target, method, gas)
    };
    let referral = |address, target, base: &'static [&'static str; 3]| {
        let methods = base
            .iter()
            .zip(REFERRAL_GAS_LIMITS)
            .map(|(name, gas_limit)| GatewayMethod { name: *name, gas_limit })
            .collect();
        Gateway::referral(MAINNET_CHAIN_ID, address, target, methods)
    };

    vec![
        // --- cSAI --- //
        plain(address!("0xb4d79feeb4b4e0dae1a33e784f398ad1062c3584"), CSAI, "etherTocDai", 275_000),
        plain(address!("0x61255c7977c40bbeaefd9ae3070396dfc0be00e6"), CSAI, "etherTocDai", 450_000),
        plain(address!("0xd76510f11ee52bc1de8de2811972977c09a2ed98"), CSAI, "etherTocDai", 800_000),
        referral(
            address!("0x70287b389aa4d35368bc9ee39cec7bf43e7439a8"),
            CSAI,
            &["etherTocDai1", "etherTocDai2", "etherTocDai3"],
        ),
        // --- cUSDC --- //
        plain(address!("0xd318fb94fA2d7e7d5855330ec2976Adcd9C27f8E"), CUSDC, "etherTocUSDC", 275_000),
        plain(address!("0xCee9B0F2e9F8b1fD5D2A4035278bdCf95cdfcf2F"), CUSDC, "etherTocUSDC", 450_000),
        plain(address!("0x7d53f81AFf8AFb53d0dA7fDEaF789829a09152A4"), CUSDC, "etherTocUSDC", 800_000),
        referral(
            address!("0x878281852d6658b17cf35daa947b70c156c80d5d"),
            CUSDC,
            &["etherTocUSDC1", "etherTocUSDC2", "etherTocUSDC3"],
        ),
        // --- iSAI --- //
        plain(address!("0xD6Bb78878f694E0C55598C4291fD5797D162eF31"), ISAI, "etherToiDai", 275_000),
        plain(address!("0x59f76D251f117Aa6546FDBE029Ec13b7f28e8911"), ISAI, "etherToiDai", 450_000),
        plain(address!("0xFB8793852597B2357Bc6679E31Ee4bD20cBD6bf2"), ISAI, "etherToiDai", 800_000),
        referral(
            address!("0x1987c3aB6895fD3A62d8d33C60B78B601c237a19"),
            ISAI,
            &["etherToiDai1", "etherToiDai2", "etherToiDai3"],
        ),
        // --- cDAI --- //
        plain(address!("0x4AEDeD2F07c51f1026A91e79049E0e8545114CB1"), CDAI, "etherTocDai", 275_000),
        plain(address!("0x341BAFfD0b71a1435378FeD01cdEa14610f0e51b"), CDAI, "etherTocDai", 450_000),
        plain(address!("0x7ddee332180Bb7E6977C154ca212D3D404Be39d1"), CDAI, "etherTocDai", 1_080_000),
        referral(
            address!("0xBa52428B34a6D5a817d4525dBA20139f64414A0F"),
            CDAI,
            &["etherTocDai1", "etherTocDai2", "etherTocDai3"],
        ),
        // --- CHAI --- //
        plain(address!("0x2e1fB28384d474a77B37fd6F35A5F430f61B9b6b"), CHAI, "etherTochai", 275_000),
        plain(address!("0x6eFFAA6450aF6F6564157314021D04C33d306897"), CHAI, "etherTochai", 450_000),
        plain(address!("0x69186f8680A614D3E0c56284Fab0Fd65C79f1283"), CHAI, "etherTochai", 800_000),
        // --- aDAI --- //
        plain(address!("0xE37B49C50C1B95C63336725688DEE33fdDa58f50"), ADAI, "etherToaDai", 300_000),
        plain(address!("0x1dd0339e916771243d7287890cc5aa51278f6b24"), ADAI, "etherToaDai", 450_000),
        plain(address!("0x79143db86c2C9Ea72e366B5cB9Ea0e849E7c6EcA"), ADAI, "etherToaDai", 800_000),
        plain(address!("0x1F8EACee9062a4bdD4FDaF5CB04F2F8336DC37ff"), ADAI, "etherToaDai", 650_000),
        // --- aUSDT --- //
        plain(address!("0xbb4f27D0612419ea9B7D1851b7474e78188137DA"), AUSDT, "etherToaUSDT", 800_000),
        // --- cUSDT --- //
        plain(address!("0x4b845B1e441B986D4593e14eb1Fc1155dfc071D9"), CUSDT, "etherTocUSDT", 800_000),
    ]
}

/// Shorthand for a mainnet asset entry
#[allow(clippy::too_many_arguments)]
fn asset(
    address: Address,
    symbol: &'static str,
    platform: Platform,
    decimals: u8,
    underlying_symbol: &'static str,
    underlying_decimals: u8,
    reserve: Option<Address>,
    creation_block: u64,
) -> Asset {
    Asset {
        chain_id: MAINNET_CHAIN_ID,
        address,
        symbol,
        platform,
        decimals,
        underlying_symbol,
        underlying_decimals,
        reserve,
        creation_block,
    }
}
