//! Capability table: which family kinds support which categories, and what
//! each supported combination requires.
//!
//! The table replaces per-algorithm engine variants. The engine looks up a
//! [`Capability`] once per handshake and follows its rule.

use crate::spec::Category;
use accord_crypto::{Combiner, FamilyKind};
use std::collections::HashMap;
use std::sync::OnceLock;

/// How the raw secret is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgreementRule {
    /// Initiator ephemeral with responder static.
    EphemeralStatic,
    /// Initiator encapsulates to the responder static KEM key.
    Encapsulate,
    /// Static with static.
    StaticStatic,
    /// Ephemeral with ephemeral.
    EphemeralEphemeral,
    /// Static and ephemeral pairs folded by a combiner.
    Combined(Combiner),
}

/// Requirements and shape of one supported (family kind, category) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capability {
    /// Secret computation.
    pub rule: AgreementRule,
    /// The responder replies with a `ServerHello`.
    pub two_pass: bool,
    /// The responder's static key is used (initiator holds its public half).
    pub responder_static: bool,
    /// The initiator's static key is used (responder holds its public half).
    pub initiator_static: bool,
}

const ANONYMOUS_DH: Capability = Capability {
    rule: AgreementRule::EphemeralStatic,
    two_pass: false,
    responder_static: true,
    initiator_static: false,
};

const ENCAPSULATE: Capability = Capability {
    rule: AgreementRule::Encapsulate,
    two_pass: false,
    responder_static: true,
    initiator_static: false,
};

const BASIC: Capability = Capability {
    rule: AgreementRule::StaticStatic,
    two_pass: true,
    responder_static: true,
    initiator_static: true,
};

const SIGNED: Capability = Capability {
    rule: AgreementRule::EphemeralEphemeral,
    two_pass: true,
    responder_static: false,
    initiator_static: false,
};

const UNIFIED: Capability = Capability {
    rule: AgreementRule::Combined(Combiner::Unified),
    two_pass: true,
    responder_static: true,
    initiator_static: true,
};

const MQV: Capability = Capability {
    rule: AgreementRule::Combined(Combiner::Mqv),
    two_pass: true,
    responder_static: true,
    initiator_static: true,
};

const SM2_EXCHANGE: Capability = Capability {
    rule: AgreementRule::Combined(Combiner::Sm2),
    two_pass: true,
    responder_static: true,
    initiator_static: true,
};

fn table() -> &'static HashMap<(FamilyKind, Category), Capability> {
    static TABLE: OnceLock<HashMap<(FamilyKind, Category), Capability>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::new();
        for kind in [FamilyKind::Dh, FamilyKind::Ec, FamilyKind::Sm2, FamilyKind::Xdh] {
            table.insert((kind, Category::Anonymous), ANONYMOUS_DH);
            table.insert((kind, Category::Basic), BASIC);
            table.insert((kind, Category::Signed), SIGNED);
            table.insert((kind, Category::Unified), UNIFIED);
        }
        for kind in [FamilyKind::Dh, FamilyKind::Ec] {
            table.insert((kind, Category::Mqv), MQV);
        }
        table.insert((FamilyKind::Sm2, Category::Mqv), SM2_EXCHANGE);
        table.insert((FamilyKind::Kem, Category::Anonymous), ENCAPSULATE);
        table.insert((FamilyKind::Kem, Category::KemEncapsulation), ENCAPSULATE);
        table
    })
}

/// Capability for a (family kind, category) pair, or `None` if unsupported.
pub fn lookup(kind: FamilyKind, category: Category) -> Option<&'static Capability> {
    table().get(&(kind, category))
}

/// True if the pair is supported.
pub fn supports(kind: FamilyKind, category: Category) -> bool {
    lookup(kind, category).is_some()
}
