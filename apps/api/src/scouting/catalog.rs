//! Fixed reference data behind the mock job feed and the financial lookup.

/// A company the mock feed can post jobs for, with its static market data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompanyProfile {
    pub name: &'static str,
    pub symbol: &'static str,
    pub price: f64,
    pub growth: f64,
    pub is_private: bool,
    pub market_cap: &'static str,
}

pub const COMPANIES: [CompanyProfile; 5] = [
    CompanyProfile {
        name: "TechFlow Systems",
        symbol: "TFS",
        price: 142.50,
        growth: 0.15,
        is_private: false,
        market_cap: "12B",
    },
    CompanyProfile {
        name: "SalesForce Dynamics",
        symbol: "CRM",
        price: 290.10,
        growth: 0.11,
        is_private: false,
        market_cap: "280B",
    },
    CompanyProfile {
        name: "StartupX",
        symbol: "",
        price: 0.0,
        growth: 0.0,
        is_private: true,
        market_cap: "N/A",
    },
    CompanyProfile {
        name: "OmniCorp Global",
        symbol: "OCG",
        price: 45.20,
        growth: -0.02,
        is_private: false,
        market_cap: "4B",
    },
    CompanyProfile {
        name: "CloudScale AI",
        symbol: "CSAI",
        price: 88.00,
        growth: 0.45,
        is_private: false,
        market_cap: "2B",
    },
];

/// Entry used when a company is not in the catalog.
pub const PRIVATE_FALLBACK: CompanyProfile = COMPANIES[2];

/// Ticker shown for every private company.
pub const PRIVATE_SYMBOL: &str = "PVT";

pub const JOB_TITLES: [&str; 5] = [
    "Director of Sales Engineering",
    "Technical Account Manager",
    "Solutions Architect",
    "Enterprise Account Executive (SaaS)",
    "Head of Growth",
];

pub const LOCATIONS: [&str; 5] = [
    "San Francisco, CA",
    "New York, NY",
    "Austin, TX",
    "Remote",
    "London, UK",
];

pub const REMOTE_LOCATION: &str = "Remote";

pub fn find_company(name: &str) -> Option<&'static CompanyProfile> {
    COMPANIES.iter().find(|c| c.name == name)
}
