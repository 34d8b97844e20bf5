//! Failure paths: forged signatures, tampered fields, bad confirmation
//! tags, misuse of the engine API and invalid specs.

use accord_core::message::HEADER_LEN;
use accord_core::{
    AgreementSpec, Category, ClientConfirm, ClientHello, Confirmation, ConfirmationTag,
    Credentials, DerivationConfig, Error, Initiator, Kdf, Phase, Responder, ServerHello,
    ServerHelloBody,
};
use accord_crypto::{AlgorithmFamily, KeyPair, SigningKeyPair};

struct Statics {
    alice: KeyPair,
    bob: KeyPair,
}

impl Statics {
    fn new(family: AlgorithmFamily) -> Self {
        Self {
            alice: KeyPair::generate(family).unwrap(),
            bob: KeyPair::generate(family).unwrap(),
        }
    }

    fn engines(&self, spec: &AgreementSpec) -> (Initiator<'_>, Responder<'_>) {
        let initiator = Initiator::new(
            spec.clone(),
            Credentials::new()
                .with_static_key_pair(&self.alice)
                .with_peer_static_key(self.bob.public_key()),
        )
        .unwrap();
        let responder = Responder::new(
            spec.clone(),
            Credentials::new()
                .with_static_key_pair(&self.bob)
                .with_peer_static_key(self.alice.public_key()),
        )
        .unwrap();
        (initiator, responder)
    }
}

fn spec(family: AlgorithmFamily, category: Category, confirmation: Confirmation) -> AgreementSpec {
    AgreementSpec::builder(family, category)
        .confirmation(confirmation)
        .build()
        .unwrap()
}

fn flip_byte(bytes: &[u8], index: usize) -> Vec<u8> {
    let mut tampered = bytes.to_vec();
    tampered[index] ^= 0x01;
    tampered
}

/// Signed category where the responder's signature is all zeros.
#[test]
fn test_zero_signature_rejected() {
    let family = AlgorithmFamily::EcdhP256;
    let spec = AgreementSpec::new(family, Category::Signed).unwrap();
    let alice = SigningKeyPair::generate();
    let bob = SigningKeyPair::generate();
    let alice_verifying = alice.verifying_key();
    let bob_verifying = bob.verifying_key();

    let mut initiator = Initiator::new(
        spec.clone(),
        Credentials::new()
            .with_signing_key(&alice)
            .with_peer_verifying_key(&bob_verifying),
    )
    .unwrap();
    let mut responder = Responder::new(
        spec,
        Credentials::new()
            .with_signing_key(&bob)
            .with_peer_verifying_key(&alice_verifying),
    )
    .unwrap();

    let hello = initiator.create_hello(None).unwrap();
    let reply = responder.accept_hello(None, hello).unwrap().unwrap();
    let ephemeral_public_key = reply
        .body()
        .ephemeral_public_key()
        .unwrap()
        .to_vec();
    let forged = ServerHello::new(
        family,
        ServerHelloBody::Signed {
            ephemeral_public_key,
            signature: vec![0u8; 64],
        },
        None,
    )
    .unwrap();

    assert!(matches!(
        initiator.accept_reply(forged),
        Err(Error::SignatureInvalid)
    ));
    assert_eq!(initiator.phase(), Phase::Failed);
    assert!(matches!(
        initiator.take_secret(),
        Err(Error::SecretUnavailable)
    ));
}

/// A hello signed with a key the responder does not trust.
#[test]
fn test_wrong_signer_rejected() {
    let spec = AgreementSpec::new(AlgorithmFamily::X448, Category::Signed).unwrap();
    let mallory = SigningKeyPair::generate();
    let alice = SigningKeyPair::generate();
    let bob = SigningKeyPair::generate();
    let alice_verifying = alice.verifying_key();
    let bob_verifying = bob.verifying_key();

    let mut impostor = Initiator::new(
        spec.clone(),
        Credentials::new()
            .with_signing_key(&mallory)
            .with_peer_verifying_key(&bob_verifying),
    )
    .unwrap();
    let mut responder = Responder::new(
        spec,
        Credentials::new()
            .with_signing_key(&bob)
            .with_peer_verifying_key(&alice_verifying),
    )
    .unwrap();

    let hello = impostor.create_hello(None).unwrap();
    assert!(matches!(
        responder.accept_hello(None, hello),
        Err(Error::SignatureInvalid)
    ));
    assert!(matches!(
        responder.take_secret(),
        Err(Error::SecretUnavailable)
    ));
}

/// Changing the signed ephemeral key invalidates the signature.
#[test]
fn test_signed_ephemeral_tamper_detected() {
    let spec = AgreementSpec::new(AlgorithmFamily::X25519, Category::Signed).unwrap();
    let alice = SigningKeyPair::generate();
    let bob = SigningKeyPair::generate();
    let alice_verifying = alice.verifying_key();
    let bob_verifying = bob.verifying_key();

    let mut initiator = Initiator::new(
        spec.clone(),
        Credentials::new()
            .with_signing_key(&alice)
            .with_peer_verifying_key(&bob_verifying),
    )
    .unwrap();
    let mut responder = Responder::new(
        spec,
        Credentials::new()
            .with_signing_key(&bob)
            .with_peer_verifying_key(&alice_verifying),
    )
    .unwrap();

    let bytes = initiator.create_hello(None).unwrap().serialize().unwrap();
    let tampered = ClientHello::parse(&flip_byte(&bytes, HEADER_LEN + 2 + 7)).unwrap();
    assert!(matches!(
        responder.accept_hello(None, tampered),
        Err(Error::SignatureInvalid)
    ));
}

/// A tampered ephemeral key that still decodes changes the secret.
#[test]
fn test_ephemeral_tamper_changes_secret() {
    let statics = Statics::new(AlgorithmFamily::X25519);
    let spec = spec(AlgorithmFamily::X25519, Category::Unified, Confirmation::None);
    let (mut initiator, mut responder) = statics.engines(&spec);

    let bytes = initiator.create_hello(None).unwrap().serialize().unwrap();
    let tampered = ClientHello::parse(&flip_byte(&bytes, HEADER_LEN + 2 + 5)).unwrap();
    let reply = responder.accept_hello(None, tampered).unwrap().unwrap();
    initiator.accept_reply(reply).unwrap();

    assert_ne!(
        initiator.take_secret().unwrap(),
        responder.take_secret().unwrap()
    );
}

/// With confirmation, the same tampering is caught by the initiator.
#[test]
fn test_ephemeral_tamper_caught_by_confirmation() {
    let statics = Statics::new(AlgorithmFamily::X25519);
    let spec = spec(
        AlgorithmFamily::X25519,
        Category::Unified,
        Confirmation::Responder,
    );
    let (mut initiator, mut responder) = statics.engines(&spec);

    let hello = initiator.create_hello(None).unwrap();
    let reply_bytes = responder
        .accept_hello(None, hello)
        .unwrap()
        .unwrap()
        .serialize()
        .unwrap();
    let tampered = ServerHello::parse(&flip_byte(&reply_bytes, HEADER_LEN + 2 + 5)).unwrap();

    assert!(matches!(
        initiator.accept_reply(tampered),
        Err(Error::ConfirmationFailed)
    ));
    assert!(matches!(
        initiator.take_secret(),
        Err(Error::SecretUnavailable)
    ));
}

/// An ephemeral point pushed off the curve fails decoding.
#[test]
fn test_off_curve_ephemeral_rejected() {
    let statics = Statics::new(AlgorithmFamily::EcdhP256);
    let spec = spec(AlgorithmFamily::EcdhP256, Category::Mqv, Confirmation::None);
    let (mut initiator, mut responder) = statics.engines(&spec);

    let bytes = initiator.create_hello(None).unwrap().serialize().unwrap();
    let tampered = ClientHello::parse(&flip_byte(&bytes, HEADER_LEN + 2 + 64)).unwrap();
    assert!(matches!(
        responder.accept_hello(None, tampered),
        Err(Error::MalformedKey(_))
    ));
    assert_eq!(responder.phase(), Phase::Failed);
}

/// FFDH values outside the prime-order subgroup fail decoding.
#[test]
fn test_ffdh_small_subgroup_rejected() {
    let family = AlgorithmFamily::Ffdhe2048;
    let responder_static = KeyPair::generate(family).unwrap();
    let spec = AgreementSpec::new(family, Category::Anonymous).unwrap();

    let mut seven = vec![0u8; 256];
    seven[255] = 7;
    let hello = ClientHello::new(
        family,
        accord_core::ClientHelloBody::AnonymousEphemeral {
            ephemeral_public_key: seven,
        },
    )
    .unwrap();

    let mut responder = Responder::new(spec, Credentials::new()).unwrap();
    assert!(matches!(
        responder.accept_hello(Some(&responder_static), hello),
        Err(Error::MalformedKey(_))
    ));
}

/// ML-KEM implicit rejection: a tampered ciphertext yields a different secret.
#[test]
fn test_ciphertext_tamper_changes_secret() {
    let family = AlgorithmFamily::MlKem512;
    let responder_static = KeyPair::generate(family).unwrap();
    let spec = AgreementSpec::new(family, Category::KemEncapsulation).unwrap();

    let mut initiator = Initiator::new(spec.clone(), Credentials::new()).unwrap();
    let bytes = initiator
        .create_hello(Some(responder_static.public_key()))
        .unwrap()
        .serialize()
        .unwrap();
    let tampered = ClientHello::parse(&flip_byte(&bytes, HEADER_LEN + 2 + 100)).unwrap();

    let mut responder = Responder::new(spec, Credentials::new()).unwrap();
    responder
        .accept_hello(Some(&responder_static), tampered)
        .unwrap();
    assert_ne!(
        initiator.take_secret().unwrap(),
        responder.take_secret().unwrap()
    );
}

#[test]
fn test_corrupted_responder_tag() {
    let statics = Statics::new(AlgorithmFamily::Ffdhe2048);
    let spec = spec(
        AlgorithmFamily::Ffdhe2048,
        Category::Basic,
        Confirmation::Responder,
    );
    let (mut initiator, mut responder) = statics.engines(&spec);

    let hello = initiator.create_hello(None).unwrap();
    let reply = responder.accept_hello(None, hello).unwrap().unwrap();
    let mut tag = *reply.confirmation_tag().unwrap().as_bytes();
    tag[0] ^= 0x80;
    let reply = reply.with_confirmation_tag(Some(ConfirmationTag::new(tag)));

    assert!(matches!(
        initiator.accept_reply(reply),
        Err(Error::ConfirmationFailed)
    ));
    assert!(matches!(
        initiator.take_secret(),
        Err(Error::SecretUnavailable)
    ));
}

#[test]
fn test_corrupted_initiator_tag() {
    let statics = Statics::new(AlgorithmFamily::EcdhP256);
    let spec = spec(
        AlgorithmFamily::EcdhP256,
        Category::Unified,
        Confirmation::Mutual,
    );
    let (mut initiator, mut responder) = statics.engines(&spec);

    let hello = initiator.create_hello(None).unwrap();
    let reply = responder.accept_hello(None, hello).unwrap().unwrap();
    let confirm = initiator.accept_reply(reply).unwrap().unwrap();

    let mut tag = *confirm.confirmation_tag().as_bytes();
    tag[31] ^= 0x01;
    let forged = confirm.with_confirmation_tag(ConfirmationTag::new(tag));

    assert!(matches!(
        responder.accept_confirm(forged),
        Err(Error::ConfirmationFailed)
    ));
    assert_eq!(responder.phase(), Phase::Failed);
    assert!(matches!(
        responder.take_secret(),
        Err(Error::SecretUnavailable)
    ));
}

/// The initiator tag cannot be replayed as the responder tag.
#[test]
fn test_tag_roles_not_interchangeable() {
    let statics = Statics::new(AlgorithmFamily::X25519);
    let spec = spec(AlgorithmFamily::X25519, Category::Basic, Confirmation::Mutual);
    let (mut initiator, mut responder) = statics.engines(&spec);

    let hello = initiator.create_hello(None).unwrap();
    let reply = responder.accept_hello(None, hello).unwrap().unwrap();
    let responder_tag = reply.confirmation_tag().unwrap().clone();
    initiator.accept_reply(reply).unwrap();

    let replayed = ClientConfirm::new(AlgorithmFamily::X25519, Category::Basic, responder_tag)
        .unwrap();
    assert!(matches!(
        responder.accept_confirm(replayed),
        Err(Error::ConfirmationFailed)
    ));
}

#[test]
fn test_missing_and_unexpected_tags() {
    let statics = Statics::new(AlgorithmFamily::X448);

    let confirmed = spec(AlgorithmFamily::X448, Category::Basic, Confirmation::Responder);
    let (mut initiator, mut responder) = statics.engines(&confirmed);
    let hello = initiator.create_hello(None).unwrap();
    let reply = responder.accept_hello(None, hello).unwrap().unwrap();
    assert!(matches!(
        initiator.accept_reply(reply.with_confirmation_tag(None)),
        Err(Error::MalformedMessage(_))
    ));

    let unconfirmed = spec(AlgorithmFamily::X448, Category::Basic, Confirmation::None);
    let (mut initiator, mut responder) = statics.engines(&unconfirmed);
    let hello = initiator.create_hello(None).unwrap();
    let reply = responder.accept_hello(None, hello).unwrap().unwrap();
    assert!(matches!(
        initiator.accept_reply(reply.with_confirmation_tag(Some(ConfirmationTag::new([0; 32])))),
        Err(Error::MalformedMessage(_))
    ));
}

#[test]
fn test_single_consumption() {
    let statics = Statics::new(AlgorithmFamily::X25519);
    let spec = spec(AlgorithmFamily::X25519, Category::Basic, Confirmation::None);
    let (mut initiator, mut responder) = statics.engines(&spec);

    let hello = initiator.create_hello(None).unwrap();
    let reply = responder.accept_hello(None, hello).unwrap().unwrap();
    initiator.accept_reply(reply).unwrap();

    initiator.take_secret().unwrap();
    responder.take_secret().unwrap();
    assert!(matches!(
        initiator.take_secret(),
        Err(Error::SecretAlreadyConsumed)
    ));
    assert!(matches!(
        responder.take_secret(),
        Err(Error::SecretAlreadyConsumed)
    ));
    assert_eq!(initiator.phase(), Phase::Consumed);
}

/// An engine runs once; later calls are out of order.
#[test]
fn test_engine_not_reusable() {
    let statics = Statics::new(AlgorithmFamily::X25519);
    let spec = spec(AlgorithmFamily::X25519, Category::Unified, Confirmation::None);
    let (mut initiator, mut responder) = statics.engines(&spec);

    let hello = initiator.create_hello(None).unwrap();
    assert!(matches!(
        initiator.create_hello(None),
        Err(Error::InvalidState)
    ));
    assert_eq!(initiator.phase(), Phase::HelloSent);

    let reply = responder.accept_hello(None, hello.clone()).unwrap().unwrap();
    assert!(matches!(
        responder.accept_hello(None, hello),
        Err(Error::InvalidState)
    ));
    assert_eq!(responder.phase(), Phase::SecretReady);

    initiator.accept_reply(reply.clone()).unwrap();
    assert!(matches!(
        initiator.accept_reply(reply),
        Err(Error::InvalidState)
    ));
    assert!(initiator.take_secret().is_ok());
}

#[test]
fn test_message_for_other_category() {
    let statics = Statics::new(AlgorithmFamily::EcdhP256);
    let basic = spec(AlgorithmFamily::EcdhP256, Category::Basic, Confirmation::None);
    let unified = spec(AlgorithmFamily::EcdhP256, Category::Unified, Confirmation::None);

    let (mut initiator, _) = statics.engines(&unified);
    let (_, mut responder) = statics.engines(&basic);
    let hello = initiator.create_hello(None).unwrap();
    assert!(matches!(
        responder.accept_hello(None, hello),
        Err(Error::MalformedMessage(_))
    ));
}

#[test]
fn test_key_family_mismatch() {
    let spec = AgreementSpec::new(AlgorithmFamily::X25519, Category::Anonymous).unwrap();
    let responder_static = KeyPair::generate(AlgorithmFamily::X25519).unwrap();
    let wrong = KeyPair::generate(AlgorithmFamily::X448).unwrap();

    let mut initiator = Initiator::new(spec.clone(), Credentials::new()).unwrap();
    let hello = initiator
        .create_hello(Some(responder_static.public_key()))
        .unwrap();

    let mut responder = Responder::new(spec, Credentials::new()).unwrap();
    assert!(matches!(
        responder.accept_hello(Some(&wrong), hello),
        Err(Error::KeyPairSpecMismatch {
            expected: AlgorithmFamily::X25519,
            actual: AlgorithmFamily::X448,
        })
    ));
}

#[test]
fn test_missing_signing_key() {
    let spec = AgreementSpec::new(AlgorithmFamily::X25519, Category::Signed).unwrap();
    let mut initiator = Initiator::new(spec, Credentials::new()).unwrap();
    assert!(matches!(
        initiator.create_hello(None),
        Err(Error::MissingCredential(_))
    ));
}

#[test]
fn test_invalid_specs() {
    let invalid = [
        AgreementSpec::builder(AlgorithmFamily::X25519, Category::Mqv).build(),
        AgreementSpec::builder(AlgorithmFamily::MlKem768, Category::Basic).build(),
        AgreementSpec::builder(AlgorithmFamily::EcdhP256, Category::KemEncapsulation).build(),
        AgreementSpec::builder(AlgorithmFamily::X448, Category::Anonymous)
            .confirmation(Confirmation::Responder)
            .build(),
        AgreementSpec::builder(AlgorithmFamily::MlKem512, Category::KemEncapsulation)
            .confirmation(Confirmation::Mutual)
            .build(),
        AgreementSpec::builder(AlgorithmFamily::X25519, Category::Basic)
            .derivation(DerivationConfig::new(Kdf::HkdfSha256, 0))
            .build(),
        AgreementSpec::builder(AlgorithmFamily::X25519, Category::Basic)
            .derivation(DerivationConfig::new(Kdf::HkdfSha256, 255 * 32 + 1))
            .build(),
    ];
    for result in invalid {
        assert!(matches!(result, Err(Error::InvalidSpec(_))));
    }
}

#[test]
fn test_secret_debug_redacted() {
    let statics = Statics::new(AlgorithmFamily::X25519);
    let spec = spec(AlgorithmFamily::X25519, Category::Basic, Confirmation::None);
    let (mut initiator, mut responder) = statics.engines(&spec);

    let hello = initiator.create_hello(None).unwrap();
    let reply = responder.accept_hello(None, hello).unwrap().unwrap();
    initiator.accept_reply(reply).unwrap();
    let secret = initiator.take_secret().unwrap();

    let shown = format!("{:?}", secret);
    assert!(shown.contains("REDACTED"));
    assert!(!shown.contains(&hex::encode(&secret.as_bytes()[..4])));
}
