//! Cryptographic conformance tests.
//!
//! Published vectors for the primitives, plus agreement symmetry for the
//! providers the engine drives.

#[cfg(test)]
mod x25519_tests {
    use accord_crypto::kex::X25519KeyPair;

    /// RFC 7748 §6.1.
    #[test]
    fn test_rfc7748_vectors() {
        let alice_private_bytes =
            hex::decode("77076d0a7318a57d3c16c17251b26645df4c2f87ebc0992ab177fba51db92c2a")
                .unwrap();
        let bob_public =
            hex::decode("de9edb7d7b7dc1b4d35b61c2ece435373f8343c85b78674dadfc7e146f882b4f")
                .unwrap();
        let expected_shared =
            hex::decode("4a5d9d5ba4ce2de1728e3bf480350f25e07e21c947d19e3376f09b3c1e161742")
                .unwrap();

        let alice_private: [u8; 32] = alice_private_bytes.try_into().unwrap();
        let alice = X25519KeyPair::from_private(alice_private).unwrap();

        let bob_pub_array: &[u8; 32] = bob_public.as_slice().try_into().unwrap();
        let shared = alice.exchange(bob_pub_array).unwrap();

        assert_eq!(&*shared, expected_shared.as_slice());
    }

    /// Low-order points yield an all-zero output, which is refused.
    #[test]
    fn test_reject_low_order_point() {
        let alice = X25519KeyPair::generate().unwrap();
        assert!(alice.exchange(&[0u8; 32]).is_err());
    }
}

#[cfg(test)]
mod x448_tests {
    use accord_crypto::kex::X448KeyPair;

    /// RFC 7748 §6.2.
    #[test]
    fn test_rfc7748_vectors() {
        let alice_private = hex::decode(
            "9a8f4925d1519f5775cf46b04b5800d4ee9ee8bae8bc5565d498c28dd9c9baf5\
             74a9419744897391006382a6f127ab1d9ac2d8c0a598726b",
        )
        .unwrap();
        let bob_public = hex::decode(
            "3eb7a829b0cd20f5bcfc0b599b6feccf6da4627107bdb0d4f345b43027d8b972\
             fc3e34fb4232a13ca706dcb57aec3dae07bdc1c67bf33609",
        )
        .unwrap();
        let expected_shared = hex::decode(
            "07fff4181ac6cc95ec1c16a94a0f74d12da232ce40a77552281d282bb60c0b56\
             fd2464c335543936521c24403085d59a449a5037514a879d",
        )
        .unwrap();

        let alice = X448KeyPair::from_private_slice(&alice_private).unwrap();
        let bob_public: &[u8; 56] = bob_public.as_slice().try_into().unwrap();
        let shared = alice.exchange(bob_public).unwrap();

        assert_eq!(&shared[..], expected_shared.as_slice());
    }
}

#[cfg(test)]
mod p256_tests {
    use accord_crypto::kex::EcdhP256KeyPair;

    /// Private scalar 1 maps to the base point.
    #[test]
    fn test_scalar_one_is_generator() {
        let mut one = [0u8; 32];
        one[31] = 1;
        let keypair = EcdhP256KeyPair::from_private(&one).unwrap();

        let expected = hex::decode(
            "04\
             6b17d1f2e12c4247f8bce6e563a440f277037d812deb33a0f4a13945d898c296\
             4fe342e2fe1a7f9b8ee7eb4a7c0f9e162bce33576b315ececbb6406837bf51f5",
        )
        .unwrap();
        assert_eq!(keypair.public_key(), expected.as_slice());
    }

    #[test]
    fn test_ecdh_symmetric() {
        let alice = EcdhP256KeyPair::generate().unwrap();
        let bob = EcdhP256KeyPair::generate().unwrap();
        let a = alice.exchange(bob.public_key()).unwrap();
        let b = bob.exchange(alice.public_key()).unwrap();
        assert_eq!(&*a, &*b);
    }

    #[test]
    fn test_ecmqv_symmetric() {
        let alice_static = EcdhP256KeyPair::generate().unwrap();
        let alice_ephemeral = EcdhP256KeyPair::generate().unwrap();
        let bob_static = EcdhP256KeyPair::generate().unwrap();
        let bob_ephemeral = EcdhP256KeyPair::generate().unwrap();

        let a = alice_static
            .mqv(
                &alice_ephemeral,
                bob_static.public_key(),
                bob_ephemeral.public_key(),
            )
            .unwrap();
        let b = bob_static
            .mqv(
                &bob_ephemeral,
                alice_static.public_key(),
                alice_ephemeral.public_key(),
            )
            .unwrap();
        assert_eq!(&*a, &*b);

        // ECMQV binds the static keys; plain ECDH of the ephemerals differs.
        let ephemeral_only = alice_ephemeral.exchange(bob_ephemeral.public_key()).unwrap();
        assert_ne!(&*a, &*ephemeral_only);
    }
}

#[cfg(test)]
mod ffdh_tests {
    use accord_crypto::kex::{FfdhGroup, FfdhKeyPair};

    #[test]
    fn test_ffdhe2048_symmetric() {
        let alice = FfdhKeyPair::generate(FfdhGroup::Ffdhe2048).unwrap();
        let bob = FfdhKeyPair::generate(FfdhGroup::Ffdhe2048).unwrap();
        assert_eq!(alice.public_key().len(), 256);

        let a = alice.exchange(bob.public_key()).unwrap();
        let b = bob.exchange(alice.public_key()).unwrap();
        assert_eq!(a.len(), 256);
        assert_eq!(&*a, &*b);
    }

    #[test]
    fn test_ffdhe3072_mqv_symmetric() {
        let group = FfdhGroup::Ffdhe3072;
        let alice_static = FfdhKeyPair::generate(group).unwrap();
        let alice_ephemeral = FfdhKeyPair::generate(group).unwrap();
        let bob_static = FfdhKeyPair::generate(group).unwrap();
        let bob_ephemeral = FfdhKeyPair::generate(group).unwrap();

        let a = alice_static
            .mqv(
                &alice_ephemeral,
                bob_static.public_key(),
                bob_ephemeral.public_key(),
            )
            .unwrap();
        let b = bob_static
            .mqv(
                &bob_ephemeral,
                alice_static.public_key(),
                alice_ephemeral.public_key(),
            )
            .unwrap();
        assert_eq!(a.len(), 384);
        assert_eq!(&*a, &*b);
    }

    /// Public values of 0, 1 and p - 1 are refused.
    #[test]
    fn test_reject_degenerate_public_values() {
        let alice = FfdhKeyPair::generate(FfdhGroup::Ffdhe2048).unwrap();

        let zero = vec![0u8; 256];
        let mut one = vec![0u8; 256];
        one[255] = 1;
        assert!(alice.exchange(&zero).is_err());
        assert!(alice.exchange(&one).is_err());
        assert!(alice.exchange(&[0xffu8; 256]).is_err());
    }
}

#[cfg(test)]
mod ml_kem_tests {
    use accord_crypto::kex::{MlKem1024KeyPair, MlKem512KeyPair, MlKem768KeyPair};

    /// FIPS 203 sizes for all three parameter sets.
    #[test]
    fn test_ml_kem_sizes() {
        assert_eq!(MlKem512KeyPair::PUBLIC_KEY_LEN, 800);
        assert_eq!(MlKem512KeyPair::CIPHERTEXT_LEN, 768);
        assert_eq!(MlKem768KeyPair::PUBLIC_KEY_LEN, 1184);
        assert_eq!(MlKem768KeyPair::CIPHERTEXT_LEN, 1088);
        assert_eq!(MlKem1024KeyPair::PUBLIC_KEY_LEN, 1568);
        assert_eq!(MlKem1024KeyPair::CIPHERTEXT_LEN, 1568);
    }

    #[test]
    fn test_ml_kem_1024_roundtrip() {
        let keypair = MlKem1024KeyPair::generate().unwrap();
        assert_eq!(keypair.public_key().len(), 1568);

        let (ciphertext, sender_secret) =
            MlKem1024KeyPair::encapsulate(keypair.public_key()).unwrap();
        assert_eq!(ciphertext.len(), 1568);
        assert_eq!(sender_secret.len(), 32);

        let recipient_secret = keypair.decapsulate(&ciphertext).unwrap();
        assert_eq!(&*sender_secret, &*recipient_secret);
    }
}

#[cfg(test)]
mod saber_tests {
    use accord_crypto::kex::{FireSaberKeyPair, LightSaberKeyPair, SaberKeyPair};
    use accord_crypto::AlgorithmFamily;

    /// Round-3 sizes agree with the family table.
    #[test]
    fn test_saber_sizes() {
        let sizes = [
            (
                AlgorithmFamily::LightSaber,
                LightSaberKeyPair::PUBLIC_KEY_LEN,
                LightSaberKeyPair::CIPHERTEXT_LEN,
            ),
            (
                AlgorithmFamily::Saber,
                SaberKeyPair::PUBLIC_KEY_LEN,
                SaberKeyPair::CIPHERTEXT_LEN,
            ),
            (
                AlgorithmFamily::FireSaber,
                FireSaberKeyPair::PUBLIC_KEY_LEN,
                FireSaberKeyPair::CIPHERTEXT_LEN,
            ),
        ];
        for (family, public_len, ciphertext_len) in sizes {
            assert_eq!(family.public_key_len(), public_len);
            assert_eq!(family.ciphertext_len(), Some(ciphertext_len));
        }
    }

    #[test]
    fn test_light_saber_roundtrip() {
        let keypair = LightSaberKeyPair::generate().unwrap();
        let (ciphertext, sender_secret) =
            LightSaberKeyPair::encapsulate(keypair.public_key()).unwrap();
        assert_eq!(ciphertext.len(), 736);

        let recipient_secret = keypair.decapsulate(&ciphertext).unwrap();
        assert_eq!(&*sender_secret, &*recipient_secret);
    }
}

#[cfg(test)]
mod sm2_tests {
    use accord_crypto::kex::Sm2KeyPair;
    use accord_crypto::Role;

    /// Key exchange between fixed static and ephemeral scalars.
    #[test]
    fn test_sm2_key_exchange_vector() {
        let pair = |byte: u8| Sm2KeyPair::from_private(&[byte; 32]).unwrap();
        let (a_static, a_ephemeral) = (pair(0x11), pair(0x22));
        let (b_static, b_ephemeral) = (pair(0x33), pair(0x44));

        let initiator = a_static
            .key_exchange(
                &a_ephemeral,
                b_static.public_key(),
                b_ephemeral.public_key(),
                Role::Initiator,
            )
            .unwrap();
        let responder = b_static
            .key_exchange(
                &b_ephemeral,
                a_static.public_key(),
                a_ephemeral.public_key(),
                Role::Responder,
            )
            .unwrap();

        assert_eq!(
            hex::encode(&*initiator),
            "4c564b350c6ca481954a63b05d92a9d68d2ed1e4b7483529c7028bfad691aa2c"
        );
        assert_eq!(&*initiator, &*responder);
    }

    #[test]
    fn test_sm2_rejects_compressed_exchange_input() {
        let alice = Sm2KeyPair::generate().unwrap();
        let bob = Sm2KeyPair::generate().unwrap();
        assert!(alice.exchange(&bob.public_key()[..33]).is_err());
    }
}

#[cfg(test)]
mod kdf_tests {
    use accord_crypto::kdf::{hkdf_sha256, x963_kdf_sha256};

    /// RFC 5869 Test Case 1.
    #[test]
    fn test_hkdf_rfc5869() {
        let ikm = hex::decode("0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b").unwrap();
        let salt = hex::decode("000102030405060708090a0b0c").unwrap();
        let info = hex::decode("f0f1f2f3f4f5f6f7f8f9").unwrap();

        let okm = hkdf_sha256(&ikm, &salt, &info, 42).unwrap();
        assert_eq!(
            hex::encode(&*okm),
            "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf34007208d5b887185865"
        );
    }

    /// NIST CAVS ANSI X9.63 KDF, SHA-256.
    #[test]
    fn test_x963_cavs() {
        let z = hex::decode("96c05619d56c328ab95fe84b18264b08725b85e33fd34f08").unwrap();
        let okm = x963_kdf_sha256(&z, &[], 16).unwrap();
        assert_eq!(hex::encode(&*okm), "443024c3dae66b95e6f5670601558f71");
    }
}

#[cfg(test)]
mod signature_tests {
    use accord_crypto::SigningKeyPair;

    /// RFC 8032 §7.1 TEST 1.
    #[test]
    fn test_ed25519_rfc8032() {
        let seed =
            hex::decode("9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60")
                .unwrap();
        let signer = SigningKeyPair::from_seed(&seed).unwrap();
        let signature = signer.sign(b"");
        assert_eq!(
            hex::encode(&signature),
            "e5564300c360ac729086e2cc806e828a84877f1eb8e5d974d873e06522490155\
             5fb8821590a33bacc61e39701cf9b46bd25bf5f0595bbe24655141438e7a100b"
        );
    }
}

#[cfg(test)]
mod provider_tests {
    use accord_crypto::{
        native_provider, AlgorithmFamily, Combiner, Error, FamilyKind, KeyCodec, KeyPair, Role,
        StandardKeyCodec,
    };

    /// Every native provider agrees with itself in both directions.
    #[test]
    fn test_raw_agreement_all_families() {
        for family in AlgorithmFamily::ALL {
            let provider = native_provider(family);
            assert_eq!(provider.family(), family);

            let alice = provider.generate_key_pair().unwrap();
            let bob = provider.generate_key_pair().unwrap();

            if family.kind() == FamilyKind::Kem {
                let (ciphertext, sent) = provider.encapsulate(bob.public_key()).unwrap();
                assert_eq!(Some(ciphertext.len()), family.ciphertext_len());
                let received = provider.decapsulate(&bob, &ciphertext).unwrap();
                assert_eq!(&*sent, &*received, "{:?}", family);
                assert!(matches!(
                    provider.raw_agree(&alice, bob.public_key()),
                    Err(Error::Unsupported(_))
                ));
            } else {
                let a = provider.raw_agree(&alice, bob.public_key()).unwrap();
                let b = provider.raw_agree(&bob, alice.public_key()).unwrap();
                assert_eq!(a.len(), family.shared_secret_len(), "{:?}", family);
                assert_eq!(&*a, &*b, "{:?}", family);
                assert!(matches!(
                    provider.encapsulate(bob.public_key()),
                    Err(Error::Unsupported(_))
                ));
            }
        }
    }

    /// Unified output is the ephemeral agreement followed by the static one.
    #[test]
    fn test_unified_combiner_layout() {
        let provider = native_provider(AlgorithmFamily::X25519);
        let alice_static = provider.generate_key_pair().unwrap();
        let alice_ephemeral = provider.generate_key_pair().unwrap();
        let bob_static = provider.generate_key_pair().unwrap();
        let bob_ephemeral = provider.generate_key_pair().unwrap();

        let combined = provider
            .combined_agree(
                Combiner::Unified,
                Role::Initiator,
                &alice_static,
                &alice_ephemeral,
                bob_static.public_key(),
                bob_ephemeral.public_key(),
            )
            .unwrap();
        let ephemeral = provider
            .raw_agree(&alice_ephemeral, bob_ephemeral.public_key())
            .unwrap();
        let static_part = provider
            .raw_agree(&alice_static, bob_static.public_key())
            .unwrap();

        assert_eq!(&combined[..32], &ephemeral[..]);
        assert_eq!(&combined[32..], &static_part[..]);
    }

    #[test]
    fn test_mqv_support_by_family() {
        for family in [AlgorithmFamily::X25519, AlgorithmFamily::X448, AlgorithmFamily::Sm2] {
            let provider = native_provider(family);
            let pair = KeyPair::generate(family).unwrap();
            assert!(matches!(
                provider.combined_agree(
                    Combiner::Mqv,
                    Role::Initiator,
                    &pair,
                    &pair,
                    pair.public_key(),
                    pair.public_key(),
                ),
                Err(Error::Unsupported(_))
            ));
        }
    }

    #[test]
    fn test_provider_rejects_foreign_keys() {
        let provider = native_provider(AlgorithmFamily::X25519);
        let own = KeyPair::generate(AlgorithmFamily::X25519).unwrap();
        let foreign = KeyPair::generate(AlgorithmFamily::X448).unwrap();
        assert!(matches!(
            provider.raw_agree(&own, foreign.public_key()),
            Err(Error::FamilyMismatch { .. })
        ));
    }

    #[test]
    fn test_codec_rejects_off_curve_point() {
        let mut bytes = KeyPair::generate(AlgorithmFamily::EcdhP256)
            .unwrap()
            .public_key()
            .as_bytes()
            .to_vec();
        bytes[64] ^= 0x01;
        assert!(StandardKeyCodec
            .decode_public_key(AlgorithmFamily::EcdhP256, &bytes)
            .is_err());
    }
}
