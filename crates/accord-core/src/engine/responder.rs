//! Responder side of the handshake.

use super::{
    check_family, check_message_spec, decode_peer_key, require, signed_payload, verify_hello,
    Credentials, Phase, Role,
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
use accord_crypto::{KeyCodec, KeyPair, PrimitiveProvider};
use std::sync::Arc;
use zeroize::Zeroizing;

enum State {
    Init,
    AwaitingConfirm {
        pending: SecretBuffer,
        key: ConfirmationKey,
        transcript: Transcript,
    },
    SecretReady(SecretBuffer),
    Consumed,
    Failed,
}

/// Responder engine.
///
/// Drive it with [`Responder::accept_hello`], then with mutual
/// confirmation [`Responder::accept_confirm`], then
/// [`Responder::take_secret`]. Under mutual confirmation the secret stays
/// locked until the initiator's tag has been verified.
pub struct Responder<'k> {
    spec: AgreementSpec,
    capability: &'static Capability,
    credentials: Credentials<'k>,
    provider: Arc<dyn PrimitiveProvider>,
    codec: Arc<dyn KeyCodec>,
    state: State,
}

impl<'k> Responder<'k> {
    /// Create a responder using the process-wide provider registry.
    pub fn new(spec: AgreementSpec, credentials: Credentials<'k>) -> Result<Self> {
        Self::with_registry(spec, credentials, &ProviderRegistry::global())
    }

    /// Create a responder using the providers in `registry`.
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
            State::AwaitingConfirm { .. } => Phase::AwaitingConfirm,
            State::SecretReady(_) => Phase::SecretReady,
            State::Consumed => Phase::Consumed,
            State::Failed => Phase::Failed,
        }
    }

    /// Process the `ClientHello`.
    ///
    /// `own_static` is the responder's static key pair; when `None` the
    /// credentials' `static_key_pair` is used. Returns the `ServerHello` to
    /// send for two-pass categories.
    pub fn accept_hello(
        &mut self,
        own_static: Option<&KeyPair>,
        hello: ClientHello,
    ) -> Result<Option<ServerHello>> {
        if !matches!(self.state, State::Init) {
            return Err(Error::InvalidState);
        }
        let result = self.respond(own_static, hello);
        self.settle(result)
    }

    /// Verify the initiator's confirmation and release the secret.
    pub fn accept_confirm(&mut self, confirm: ClientConfirm) -> Result<()> {
        let (pending, key, transcript) = match std::mem::replace(&mut self.state, State::Failed) {
            State::AwaitingConfirm {
                pending,
                key,
                transcript,
            } => (pending, key, transcript),
            other => {
                self.state = other;
                return Err(Error::InvalidState);
            }
        };

        let result = check_message_spec(
            (self.spec.family(), self.spec.category()),
            (confirm.family(), confirm.category()),
        )
        .and_then(|()| {
            key.verify(
                Role::Initiator,
                transcript.as_bytes(),
                confirm.confirmation_tag(),
            )
        })
        .map(|()| ((), State::SecretReady(pending)));
        self.settle(result)
    }

    /// Take the agreed secret. Succeeds once.
    ///
    /// # Errors
    ///
    /// - `Error::SecretAlreadyConsumed` on a second call
    /// - `Error::SecretUnavailable` after a failed handshake
    /// - `Error::InvalidState` before the handshake has finished, including
    ///   while a mutual confirmation is outstanding
    pub fn take_secret(&mut self) -> Result<SecretBuffer> {
        match std::mem::replace(&mut self.state, State::Consumed) {
            State::SecretReady(secret) => {
                tracing::debug!(
                    family = ?self.spec.family(),
                    category = ?self.spec.category(),
                    "responder secret taken"
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
                    "responder advanced"
                );
                Ok(output)
            }
            Err(err) => {
                self.state = State::Failed;
                tracing::warn!(
                    family = ?self.spec.family(),
                    category = ?self.spec.category(),
                    error = %err,
                    "responder handshake aborted"
                );
                Err(err)
            }
        }
    }

    fn respond(
        &self,
        own_static: Option<&KeyPair>,
        hello: ClientHello,
    ) -> Result<(Option<ServerHello>, State)> {
        let family = self.spec.family();
        let category = self.spec.category();
        check_message_spec((family, category), (hello.family(), hello.category()))?;

        let own_static = own_static.or(self.credentials.static_key_pair);
        if let Some(pair) = own_static {
            check_family(family, pair.family())?;
        }
        if self.capability.responder_static {
            require(own_static, "responder static key pair")?;
        }
        if self.capability.initiator_static {
            require(self.credentials.peer_static_key, "initiator static public key")?;
        }

        let (raw, body): (Zeroizing<Vec<u8>>, Option<ServerHelloBody>) =
            match (self.capability.rule, hello.body()) {
                (
                    AgreementRule::Encapsulate,
                    ClientHelloBody::AnonymousKem { kem_ciphertext }
                    | ClientHelloBody::KemEncapsulation { kem_ciphertext },
                ) => {
                    let own = require(own_static, "responder static key pair")?;
                    (self.provider.decapsulate(own, kem_ciphertext)?, None)
                }
                (
                    AgreementRule::EphemeralStatic,
                    ClientHelloBody::AnonymousEphemeral {
                        ephemeral_public_key,
                    },
                ) => {
                    let own = require(own_static, "responder static key pair")?;
                    let peer = decode_peer_key(self.codec.as_ref(), family, ephemeral_public_key)?;
                    (self.provider.raw_agree(own, &peer)?, None)
                }
                (AgreementRule::StaticStatic, ClientHelloBody::Basic) => {
                    let own = require(own_static, "responder static key pair")?;
                    let peer =
                        require(self.credentials.peer_static_key, "initiator static public key")?;
                    (
                        self.provider.raw_agree(own, peer)?,
                        Some(ServerHelloBody::Basic),
                    )
                }
                (
                    AgreementRule::EphemeralEphemeral,
                    ClientHelloBody::Signed {
                        ephemeral_public_key,
                        signature,
                    },
                ) => {
                    let signer = require(self.credentials.signing_key, "signing key pair")?;
                    let key = require(self.credentials.peer_verifying_key, "peer verifying key")?;
                    verify_hello(
                        self.provider.as_ref(),
                        key,
                        Role::Initiator,
                        ephemeral_public_key,
                        signature,
                    )?;
                    let peer = decode_peer_key(self.codec.as_ref(), family, ephemeral_public_key)?;

                    let ephemeral = self.provider.generate_key_pair()?;
                    let raw = self.provider.raw_agree(&ephemeral, &peer)?;
                    let ephemeral_public_key = self.codec.encode_public_key(ephemeral.public_key());
                    let payload = signed_payload(Role::Responder, family, &ephemeral_public_key);
                    let signature = self.provider.sign(signer, &payload)?;
                    (
                        raw,
                        Some(ServerHelloBody::Signed {
                            ephemeral_public_key,
                            signature,
                        }),
                    )
                }
                (
                    AgreementRule::Combined(combiner),
                    ClientHelloBody::Unified {
                        ephemeral_public_key,
                    }
                    | ClientHelloBody::Mqv {
                        ephemeral_public_key,
                    },
                ) => {
                    let peer_ephemeral =
                        decode_peer_key(self.codec.as_ref(), family, ephemeral_public_key)?;
                    let ephemeral = self.provider.generate_key_pair()?;
                    let raw = self.provider.combined_agree(
                        combiner,
                        Role::Responder,
                        require(own_static, "responder static key pair")?,
                        &ephemeral,
                        require(self.credentials.peer_static_key, "initiator static public key")?,
                        &peer_ephemeral,
                    )?;
                    let ephemeral_public_key = self.codec.encode_public_key(ephemeral.public_key());
                    let body = match category {
                        Category::Mqv => ServerHelloBody::Mqv {
                            ephemeral_public_key,
                        },
                        _ => ServerHelloBody::Unified {
                            ephemeral_public_key,
                        },
                    };
                    (raw, Some(body))
                }
                _ => {
                    return Err(Error::MalformedMessage(format!(
                        "unexpected ClientHello body for {:?}",
                        category
                    )))
                }
            };

        let Some(body) = body else {
            let secret = sdf::finalize(self.spec.derivation(), raw)?;
            return Ok((None, State::SecretReady(secret)));
        };

        let reply = ServerHello::new(family, body, None)?;
        let hello_bytes = hello.serialize()?;
        let mut transcript = Transcript::new();
        transcript.append(&hello_bytes);
        transcript.append(&reply.transcript_bytes()?);

        if self.spec.confirmation() == Confirmation::None {
            let secret = sdf::finalize(self.spec.derivation(), raw)?;
            return Ok((Some(reply), State::SecretReady(secret)));
        }

        let key = ConfirmationKey::derive(&raw)?;
        let tag = key.tag(Role::Responder, transcript.as_bytes())?;
        let reply = reply.with_confirmation_tag(Some(tag));
        let secret = sdf::finalize(self.spec.derivation(), raw)?;

        let next = if self.spec.confirmation() == Confirmation::Mutual {
            let mut transcript = Transcript::new();
            transcript.append(&hello_bytes);
            transcript.append(&reply.serialize()?);
            State::AwaitingConfirm {
                pending: secret,
                key,
                transcript,
            }
        } else {
            State::SecretReady(secret)
        };
        Ok((Some(reply), next))
    }
}

impl core::fmt::Debug for Responder<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Responder")
            .field("spec", &self.spec)
            .field("phase", &self.phase())
            .finish()
    }
}
