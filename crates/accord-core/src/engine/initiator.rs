//! Initiator side of the handshake.

use super::{
    check_message_spec, decode_peer_key, require, signed_payload, verify_hello, Credentials,
    Phase, Role,
};
use crate::capability::{AgreementRule, Capability};
use crate::confirm::ConfirmationKey;
use crate::message::{ClientConfirm, ClientHello, ClientHelloBody, ServerHello, ServerHelloBody};
use crate::registry::ProviderRegistry;
use crate::sdf;
use crate::secret::SecretBuffer;
use crate::spec::{AgreementSpec, Category, Confirmation};
use crate::transcript::Transcript;
use crate::{Error, Result};
use accord_crypto::{KeyCodec, KeyPair, PrimitiveProvider, PublicKey};
use std::sync::Arc;

enum State {
    Init,
    HelloSent {
        ephemeral: Option<KeyPair>,
        responder_static: Option<PublicKey>,
        transcript: Transcript,
    },
    SecretReady(SecretBuffer),
    Consumed,
    Failed,
}

/// Initiator engine.
///
/// Drive it with [`Initiator::create_hello`], then for two-pass categories
/// [`Initiator::accept_reply`], then [`Initiator::take_secret`].
///
/// # Example
///
/// ```
/// use accord_core::{AgreementSpec, Category, Credentials, Initiator, Responder};
/// use accord_crypto::{AlgorithmFamily, KeyPair};
///
/// let spec = AgreementSpec::new(AlgorithmFamily::MlKem768, Category::Anonymous).unwrap();
/// let responder_static = KeyPair::generate(AlgorithmFamily::MlKem768).unwrap();
///
/// let mut initiator = Initiator::new(spec.clone(), Credentials::new()).unwrap();
/// let hello = initiator.create_hello(Some(responder_static.public_key())).unwrap();
///
/// let mut responder = Responder::new(spec, Credentials::new()).unwrap();
/// assert!(responder.accept_hello(Some(&responder_static), hello).unwrap().is_none());
///
/// assert_eq!(initiator.take_secret().unwrap(), responder.take_secret().unwrap());
/// ```
pub struct Initiator<'k> {
    spec: AgreementSpec,
    capability: &'static Capability,
    credentials: Credentials<'k>,
    provider: Arc<dyn PrimitiveProvider>,
    codec: Arc<dyn KeyCodec>,
    state: State,
}

impl<'k> Initiator<'k> {
    /// Create an initiator using the process-wide provider registry.
    pub fn new(spec: AgreementSpec, credentials: Credentials<'k>) -> Result<Self> {
        Self::with_registry(spec, credentials, &ProviderRegistry::global())
    }

    /// Create an initiator using the providers in `registry`.
    ///
    /// # Errors
    ///
    /// - `Error::InvalidSpec` if the registry has no provider or codec for the family
    /// - `Error::KeyPairSpecMismatch` if a supplied key belongs to another family
    pub fn with_registry(
        spec: AgreementSpec,
        credentials: Credentials<'k>,
        registry: &ProviderRegistry,
    ) -> Result<Self> {
        let capability = spec.capability()?;
        let provider = registry.provider(spec.family())?;
        let codec = registry.codec(spec.family())?;
        credentials.check_families(spec.family())?;

        Ok(Self {
            spec,
            capability,
            credentials,
            provider,
            codec,
            state: State::Init,
        })
    }

    /// Agreement spec this engine runs.
    pub fn spec(&self) -> &AgreementSpec {
        &self.spec
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        match self.state {
            State::Init => Phase::Init,
            State::HelloSent { .. } => Phase::HelloSent,
            State::SecretReady(_) => Phase::SecretReady,
            State::Consumed => Phase::Consumed,
            State::Failed => Phase::Failed,
        }
    }

    /// Build the `ClientHello`.
    ///
    /// `responder_static` is the responder's static public key; when `None`
    /// the credentials' `peer_static_key` is used. For one-pass categories
    /// the secret is ready as soon as this returns.
    pub fn create_hello(&mut self, responder_static: Option<&PublicKey>) -> Result<ClientHello> {
        if !matches!(self.state, State::Init) {
            return Err(Error::InvalidState);
        }
        let result = self.build_hello(responder_static);
        self.settle(result)
    }

    /// Process the `ServerHello`.
    ///
    /// Returns the `ClientConfirm` to send when mutual confirmation is
    /// requested.
    pub fn accept_reply(&mut self, reply: ServerHello) -> Result<Option<ClientConfirm>> {
        let (ephemeral, responder_static, transcript) =
            match std::mem::replace(&mut self.state, State::Failed) {
                State::HelloSent {
                    ephemeral,
                    responder_static,
                    transcript,
                } => (ephemeral, responder_static, transcript),
                other => {
                    self.state = other;
                    return Err(Error::InvalidState);
                }
            };

        let result = self.finish(reply, ephemeral, responder_static, transcript);
        self.settle(result)
    }

    /// Take the agreed secret. Succeeds once.
    ///
    /// # Errors
    ///
    /// - `Error::SecretAlreadyConsumed` on a second call
    /// - `Error::SecretUnavailable` after a failed handshake
    /// - `Error::InvalidState` before the handshake has finished
    pub fn take_secret(&mut self) -> Result<SecretBuffer> {
        match std::mem::replace(&mut self.state, State::Consumed) {
            State::SecretReady(secret) => {
                tracing::debug!(
                    family = ?self.spec.family(),
                    category = ?self.spec.category(),
                    "initiator secret taken"
                );
                Ok(secret)
            }
            State::Consumed => Err(Error::SecretAlreadyConsumed),
            State::Failed => {
                self.state = State::Failed;
                Err(Error::SecretUnavailable)
            }
            other => {
                self.state = other;
                Err(Error::InvalidState)
            }
        }
    }

    fn settle<T>(&mut self, result: Result<(T, State)>) -> Result<T> {
        match result {
            Ok((output, next)) => {
                self.state = next;
                tracing::debug!(
                    family = ?self.spec.family(),
                    category = ?self.spec.category(),
                    phase = ?self.phase(),
                    "initiator advanced"
                );
                Ok(output)
            }
            Err(err) => {
                self.state = State::Failed;
                tracing::warn!(
                    family = ?self.spec.family(),
                    category = ?self.spec.category(),
                    error = %err,
                    "initiator handshake aborted"
                );
                Err(err)
            }
        }
    }

    fn build_hello(&self, responder_static: Option<&PublicKey>) -> Result<(ClientHello, State)> {
        let family = self.spec.family();
        let category = self.spec.category();

        let responder_static = responder_static.or(self.credentials.peer_static_key);
        if let Some(key) = responder_static {
            super::check_family(family, key.family())?;
        }
        let responder_static = if self.capability.responder_static {
            Some(require(responder_static, "responder static public key")?)
        } else {
            None
        };
        if self.capability.initiator_static {
            require(self.credentials.static_key_pair, "initiator static key pair")?;
        }

        let mut ephemeral = None;
        let body = match self.capability.rule {
            AgreementRule::Encapsulate => {
                let peer = require(responder_static, "responder static public key")?;
                let (kem_ciphertext, raw) = self.provider.encapsulate(peer)?;
                let body = match category {
                    Category::KemEncapsulation => ClientHelloBody::KemEncapsulation { kem_ciphertext },
                    _ => ClientHelloBody::AnonymousKem { kem_ciphertext },
                };
                let hello = ClientHello::new(family, body)?;
                let secret = sdf::finalize(self.spec.derivation(), raw)?;
                return Ok((hello, State::SecretReady(secret)));
            }
            AgreementRule::EphemeralStatic => {
                let peer = require(responder_static, "responder static public key")?;
                let pair = self.provider.generate_key_pair()?;
                let raw = self.provider.raw_agree(&pair, peer)?;
                let hello = ClientHello::new(
                    family,
                    ClientHelloBody::AnonymousEphemeral {
                        ephemeral_public_key: self.codec.encode_public_key(pair.public_key()),
                    },
                )?;
                let secret = sdf::finalize(self.spec.derivation(), raw)?;
                return Ok((hello, State::SecretReady(secret)));
            }
            AgreementRule::StaticStatic => ClientHelloBody::Basic,
            AgreementRule::EphemeralEphemeral => {
                let signer = require(self.credentials.signing_key, "signing key pair")?;
                require(self.credentials.peer_verifying_key, "peer verifying key")?;

                let pair = self.provider.generate_key_pair()?;
                let ephemeral_public_key = self.codec.encode_public_key(pair.public_key());
                let payload = signed_payload(Role::Initiator, family, &ephemeral_public_key);
                let signature = self.provider.sign(signer, &payload)?;
                ephemeral = Some(pair);
                ClientHelloBody::Signed {
                    ephemeral_public_key,
                    signature,
                }
            }
            AgreementRule::Combined(_) => {
                let pair = self.provider.generate_key_pair()?;
                let ephemeral_public_key = self.codec.encode_public_key(pair.public_key());
                ephemeral = Some(pair);
                match category {
                    Category::Mqv => ClientHelloBody::Mqv {
                        ephemeral_public_key,
                    },
                    _ => ClientHelloBody::Unified {
                        ephemeral_public_key,
                    },
                }
            }
        };

        let hello = ClientHello::new(family, body)?;
        let mut transcript = Transcript::new();
        transcript.append(&hello.serialize()?);

        Ok((
            hello,
            State::HelloSent {
                ephemeral,
                responder_static: responder_static.cloned(),
                transcript,
            },
        ))
    }

    fn finish(
        &self,
        reply: ServerHello,
        ephemeral: Option<KeyPair>,
        responder_static: Option<PublicKey>,
        mut transcript: Transcript,
    ) -> Result<(Option<ClientConfirm>, State)> {
        let family = self.spec.family();
        check_message_spec(
            (family, self.spec.category()),
            (reply.family(), reply.category()),
        )?;

        let raw = match (self.capability.rule, reply.body()) {
            (AgreementRule::StaticStatic, ServerHelloBody::Basic) => {
                let own = require(self.credentials.static_key_pair, "initiator static key pair")?;
                let peer = require(responder_static.as_ref(), "responder static public key")?;
                self.provider.raw_agree(own, peer)?
            }
            (
                AgreementRule::EphemeralEphemeral,
                ServerHelloBody::Signed {
                    ephemeral_public_key,
                    signature,
                },
            ) => {
                let key = require(self.credentials.peer_verifying_key, "peer verifying key")?;
                verify_hello(
                    self.provider.as_ref(),
                    key,
                    Role::Responder,
                    ephemeral_public_key,
                    signature,
                )?;
                let peer = decode_peer_key(self.codec.as_ref(), family, ephemeral_public_key)?;
                let own = require(ephemeral.as_ref(), "initiator ephemeral key pair")?;
                self.provider.raw_agree(own, &peer)?
            }
            (
                AgreementRule::Combined(combiner),
                ServerHelloBody::Unified {
                    ephemeral_public_key,
                }
                | ServerHelloBody::Mqv {
                    ephemeral_public_key,
                },
            ) => {
                let peer_ephemeral =
                    decode_peer_key(self.codec.as_ref(), family, ephemeral_public_key)?;
                self.provider.combined_agree(
                    combiner,
                    Role::Initiator,
                    require(self.credentials.static_key_pair, "initiator static key pair")?,
                    require(ephemeral.as_ref(), "initiator ephemeral key pair")?,
                    require(responder_static.as_ref(), "responder static public key")?,
                    &peer_ephemeral,
                )?
            }
            _ => {
                return Err(Error::MalformedMessage(format!(
                    "unexpected ServerHello body for {:?}",
                    self.spec.category()
                )))
            }
        };
        drop(ephemeral);

        let confirm = match (self.spec.confirmation(), reply.confirmation_tag()) {
            (Confirmation::None, None) => None,
            (Confirmation::None, Some(_)) => {
                return Err(Error::MalformedMessage(
                    "unexpected confirmation tag".into(),
                ))
            }
            (_, None) => {
                return Err(Error::MalformedMessage("missing confirmation tag".into()));
            }
            (confirmation, Some(tag)) => {
                let key = ConfirmationKey::derive(&raw)?;
                let mut responder_view = transcript.clone();
                responder_view.append(&reply.transcript_bytes()?);
                key.verify(Role::Responder, responder_view.as_bytes(), tag)?;
                if confirmation == Confirmation::Mutual {
                    transcript.append(&reply.serialize()?);
                    let tag = key.tag(Role::Initiator, transcript.as_bytes())?;
                    Some(ClientConfirm::new(family, self.spec.category(), tag)?)
                } else {
                    None
                }
            }
        };

        let secret = sdf::finalize(self.spec.derivation(), raw)?;
        Ok((confirm, State::SecretReady(secret)))
    }
}

impl core::fmt::Debug for Initiator<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Initiator")
            .field("spec", &self.spec)
            .field("phase", &self.phase())
            .finish()
    }
}
