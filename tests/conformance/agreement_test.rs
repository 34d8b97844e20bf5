//! Agreement conformance: every supported (family, category) pair reaches
//! the same secret on both sides, with and without confirmation and
//! derivation. Messages cross a serialize/parse boundary on every hop.

use accord_core::sdf;
use accord_core::{
    AgreementSpec, Category, ClientConfirm, ClientHello, Confirmation, Credentials,
    DerivationConfig, Initiator, Kdf, Phase, ProviderRegistry, Responder, SecretBuffer,
    ServerHello,
};
use accord_crypto::{
    native_provider, AlgorithmFamily, Combiner, KeyPair, PrimitiveProvider, PublicKey, Role,
    SigningKeyPair,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use zeroize::Zeroizing;

struct Parties {
    initiator_static: KeyPair,
    responder_static: KeyPair,
    initiator_signer: SigningKeyPair,
    responder_signer: SigningKeyPair,
}

impl Parties {
    fn new(family: AlgorithmFamily) -> Self {
        Self {
            initiator_static: KeyPair::generate(family).unwrap(),
            responder_static: KeyPair::generate(family).unwrap(),
            initiator_signer: SigningKeyPair::generate(),
            responder_signer: SigningKeyPair::generate(),
        }
    }
}

fn run_with(
    spec: &AgreementSpec,
    parties: &Parties,
    registry: &ProviderRegistry,
) -> (SecretBuffer, SecretBuffer) {
    let initiator_verifying = parties.initiator_signer.verifying_key();
    let responder_verifying = parties.responder_signer.verifying_key();

    let mut initiator = Initiator::with_registry(
        spec.clone(),
        Credentials::new()
            .with_static_key_pair(&parties.initiator_static)
            .with_signing_key(&parties.initiator_signer)
            .with_peer_verifying_key(&responder_verifying),
        registry,
    )
    .unwrap();
    let mut responder = Responder::with_registry(
        spec.clone(),
        Credentials::new()
            .with_static_key_pair(&parties.responder_static)
            .with_peer_static_key(parties.initiator_static.public_key())
            .with_signing_key(&parties.responder_signer)
            .with_peer_verifying_key(&initiator_verifying),
        registry,
    )
    .unwrap();

    let hello = initiator
        .create_hello(Some(parties.responder_static.public_key()))
        .unwrap();
    let hello = ClientHello::parse(&hello.serialize().unwrap()).unwrap();

    let reply = responder.accept_hello(None, hello).unwrap();
    assert_eq!(reply.is_some(), spec.category().is_two_pass());

    if let Some(reply) = reply {
        assert_eq!(reply.confirmation_tag().is_some(), spec.confirm_requested());
        let reply = ServerHello::parse(&reply.serialize().unwrap()).unwrap();

        let confirm = initiator.accept_reply(reply).unwrap();
        assert_eq!(
            confirm.is_some(),
            spec.confirmation() == Confirmation::Mutual
        );
        if let Some(confirm) = confirm {
            assert_eq!(responder.phase(), Phase::AwaitingConfirm);
            let confirm = ClientConfirm::parse(&confirm.serialize().unwrap()).unwrap();
            responder.accept_confirm(confirm).unwrap();
        }
    }

    assert_eq!(initiator.phase(), Phase::SecretReady);
    assert_eq!(responder.phase(), Phase::SecretReady);
    (initiator.take_secret().unwrap(), responder.take_secret().unwrap())
}

fn run(spec: &AgreementSpec, parties: &Parties) -> (SecretBuffer, SecretBuffer) {
    run_with(spec, parties, &ProviderRegistry::global())
}

fn raw_secret_len(family: AlgorithmFamily, category: Category) -> usize {
    match category {
        Category::Unified => 2 * family.shared_secret_len(),
        _ => family.shared_secret_len(),
    }
}

fn confirmations(category: Category) -> Vec<Confirmation> {
    if category.is_two_pass() {
        vec![
            Confirmation::None,
            Confirmation::Responder,
            Confirmation::Mutual,
        ]
    } else {
        vec![Confirmation::None]
    }
}

fn check_family(family: AlgorithmFamily) {
    let parties = Parties::new(family);
    let mut covered = 0;

    for category in Category::ALL {
        if AgreementSpec::new(family, category).is_err() {
            continue;
        }
        for confirmation in confirmations(category) {
            for derivation in [None, Some(DerivationConfig::new(Kdf::HkdfSha512, 48))] {
                let mut builder =
                    AgreementSpec::builder(family, category).confirmation(confirmation);
                if let Some(derivation) = derivation.clone() {
                    builder = builder.derivation(derivation);
                }
                let spec = builder.build().unwrap();

                let (initiator, responder) = run(&spec, &parties);
                assert_eq!(
                    initiator, responder,
                    "{:?}/{:?}/{:?}",
                    family, category, confirmation
                );
                let expected_len = match derivation {
                    Some(config) => config.output_len,
                    None => raw_secret_len(family, category),
                };
                assert_eq!(initiator.len(), expected_len);
                covered += 1;
            }
        }
    }
    assert!(covered > 0);
}

#[test]
fn test_matrix_ffdhe2048() {
    check_family(AlgorithmFamily::Ffdhe2048);
}

#[test]
fn test_matrix_ffdhe3072() {
    check_family(AlgorithmFamily::Ffdhe3072);
}

#[test]
fn test_matrix_p256() {
    check_family(AlgorithmFamily::EcdhP256);
}

#[test]
fn test_matrix_sm2() {
    check_family(AlgorithmFamily::Sm2);
}

#[test]
fn test_matrix_x25519() {
    check_family(AlgorithmFamily::X25519);
}

#[test]
fn test_matrix_x448() {
    check_family(AlgorithmFamily::X448);
}

#[test]
fn test_matrix_ml_kem() {
    for family in [
        AlgorithmFamily::MlKem512,
        AlgorithmFamily::MlKem768,
        AlgorithmFamily::MlKem1024,
    ] {
        check_family(family);
    }
}

#[test]
fn test_matrix_saber() {
    for family in [
        AlgorithmFamily::LightSaber,
        AlgorithmFamily::Saber,
        AlgorithmFamily::FireSaber,
    ] {
        check_family(family);
    }
}

/// SM2 under the MQV category runs SM2 key exchange: a 32-byte key that
/// differs between sessions because both sides contribute ephemerals.
#[test]
fn test_scenario_sm2_key_exchange() {
    let parties = Parties::new(AlgorithmFamily::Sm2);
    let spec = AgreementSpec::builder(AlgorithmFamily::Sm2, Category::Mqv)
        .confirmation(Confirmation::Mutual)
        .build()
        .unwrap();

    let (first_initiator, first_responder) = run(&spec, &parties);
    let (second_initiator, _) = run(&spec, &parties);
    assert_eq!(first_initiator, first_responder);
    assert_eq!(first_initiator.len(), 32);
    assert_ne!(first_initiator, second_initiator);
}

/// ML-KEM-768 anonymous: one message, 32-byte secrets on both sides.
#[test]
fn test_scenario_anonymous_kem() {
    let spec = AgreementSpec::new(AlgorithmFamily::MlKem768, Category::Anonymous).unwrap();
    let responder_static = KeyPair::generate(AlgorithmFamily::MlKem768).unwrap();

    let mut initiator = Initiator::new(spec.clone(), Credentials::new()).unwrap();
    let hello = initiator
        .create_hello(Some(responder_static.public_key()))
        .unwrap();
    assert_eq!(hello.body().kem_ciphertext().map(<[u8]>::len), Some(1088));
    assert_eq!(initiator.phase(), Phase::SecretReady);

    let mut responder = Responder::new(spec, Credentials::new()).unwrap();
    assert!(responder
        .accept_hello(Some(&responder_static), hello)
        .unwrap()
        .is_none());

    let a = initiator.take_secret().unwrap();
    let b = responder.take_secret().unwrap();
    assert_eq!(a.len(), 32);
    assert_eq!(a, b);
}

/// P-256 basic: both hellos are empty, secrets are equal.
#[test]
fn test_scenario_basic_ec() {
    let spec = AgreementSpec::new(AlgorithmFamily::EcdhP256, Category::Basic).unwrap();
    let alice = KeyPair::generate(AlgorithmFamily::EcdhP256).unwrap();
    let bob = KeyPair::generate(AlgorithmFamily::EcdhP256).unwrap();

    let mut initiator =
        Initiator::new(spec.clone(), Credentials::new().with_static_key_pair(&alice)).unwrap();
    let mut responder = Responder::new(
        spec,
        Credentials::new().with_peer_static_key(alice.public_key()),
    )
    .unwrap();

    let hello = initiator.create_hello(Some(bob.public_key())).unwrap();
    assert!(hello.body().ephemeral_public_key().is_none());
    assert!(hello.body().kem_ciphertext().is_none());

    let reply = responder.accept_hello(Some(&bob), hello).unwrap().unwrap();
    assert!(reply.body().ephemeral_public_key().is_none());
    assert!(reply.confirmation_tag().is_none());

    assert!(initiator.accept_reply(reply).unwrap().is_none());
    let a = initiator.take_secret().unwrap();
    let b = responder.take_secret().unwrap();
    assert_eq!(a.len(), 32);
    assert_eq!(a, b);
}

/// Static-static agreement is deterministic, so a derived secret must equal
/// the derivation applied to the raw secret of a separate handshake.
#[test]
fn test_derivation_applies_to_raw_secret() {
    let parties = Parties::new(AlgorithmFamily::X25519);
    let raw_spec = AgreementSpec::new(AlgorithmFamily::X25519, Category::Basic).unwrap();
    let (raw, _) = run(&raw_spec, &parties);

    for config in [
        DerivationConfig::default(),
        DerivationConfig::new(Kdf::HkdfSha512, 64).with_salt(b"salt".to_vec()),
        DerivationConfig::new(Kdf::X963Sha256, 40).with_context(b"session 7".to_vec()),
    ] {
        let spec = AgreementSpec::builder(AlgorithmFamily::X25519, Category::Basic)
            .derivation(config.clone())
            .build()
            .unwrap();
        let (a, b) = run(&spec, &parties);
        assert_eq!(a, b);
        assert_eq!(a, sdf::derive(&config, raw.as_bytes()).unwrap());
        assert_eq!(a.len(), config.output_len);
    }
}

#[test]
fn test_derivation_deterministic() {
    let config = DerivationConfig::new(Kdf::HkdfSha256, 32)
        .with_label(b"app".to_vec())
        .with_context(b"ctx".to_vec());
    let a = sdf::derive(&config, &[0x42; 56]).unwrap();
    let b = sdf::derive(&config, &[0x42; 56]).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, sdf::derive(&config, &[0x43; 56]).unwrap());
}

/// Ephemeral categories give a fresh secret per handshake.
#[test]
fn test_ephemeral_secrets_are_fresh() {
    let parties = Parties::new(AlgorithmFamily::X448);
    let spec = AgreementSpec::new(AlgorithmFamily::X448, Category::Unified).unwrap();
    let (first, _) = run(&spec, &parties);
    let (second, _) = run(&spec, &parties);
    assert_ne!(first, second);
}

/// Static key pairs can be passed per call instead of through credentials.
#[test]
fn test_static_keys_as_arguments() {
    let family = AlgorithmFamily::Ffdhe2048;
    let responder_static = KeyPair::generate(family).unwrap();
    let spec = AgreementSpec::new(family, Category::Anonymous).unwrap();

    let mut initiator = Initiator::new(
        spec.clone(),
        Credentials::new().with_peer_static_key(responder_static.public_key()),
    )
    .unwrap();
    let hello = initiator.create_hello(None).unwrap();

    let mut responder = Responder::new(
        spec,
        Credentials::new().with_static_key_pair(&responder_static),
    )
    .unwrap();
    responder.accept_hello(None, hello).unwrap();
    assert_eq!(
        initiator.take_secret().unwrap(),
        responder.take_secret().unwrap()
    );
}

struct CountingProvider {
    inner: Arc<dyn PrimitiveProvider>,
    agreements: AtomicUsize,
}

impl PrimitiveProvider for CountingProvider {
    fn family(&self) -> AlgorithmFamily {
        self.inner.family()
    }

    fn generate_key_pair(&self) -> accord_crypto::Result<KeyPair> {
        self.inner.generate_key_pair()
    }

    fn key_pair_from_private(&self, private: &[u8]) -> accord_crypto::Result<KeyPair> {
        self.inner.key_pair_from_private(private)
    }

    fn raw_agree(
        &self,
        own: &KeyPair,
        peer: &PublicKey,
    ) -> accord_crypto::Result<Zeroizing<Vec<u8>>> {
        self.agreements.fetch_add(1, Ordering::SeqCst);
        self.inner.raw_agree(own, peer)
    }

    fn combined_agree(
        &self,
        combiner: Combiner,
        role: Role,
        own_static: &KeyPair,
        own_ephemeral: &KeyPair,
        peer_static: &PublicKey,
        peer_ephemeral: &PublicKey,
    ) -> accord_crypto::Result<Zeroizing<Vec<u8>>> {
        self.agreements.fetch_add(1, Ordering::SeqCst);
        self.inner.combined_agree(
            combiner,
            role,
            own_static,
            own_ephemeral,
            peer_static,
            peer_ephemeral,
        )
    }
}

/// A registered provider replaces the native one for its family.
#[test]
fn test_registered_provider_is_used() {
    let family = AlgorithmFamily::EcdhP256;
    let counting = Arc::new(CountingProvider {
        inner: native_provider(family),
        agreements: AtomicUsize::new(0),
    });
    let mut registry = ProviderRegistry::with_defaults();
    assert!(registry.register(counting.clone()).is_some());

    let parties = Parties::new(family);
    for category in [Category::Basic, Category::Mqv] {
        let spec = AgreementSpec::new(family, category).unwrap();
        let (a, b) = run_with(&spec, &parties, &registry);
        assert_eq!(a, b);
    }
    // One agreement per side per handshake.
    assert_eq!(counting.agreements.load(Ordering::SeqCst), 4);
}
