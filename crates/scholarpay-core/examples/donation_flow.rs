/*
[INPUT]:  Local keypair and platform API endpoints
[OUTPUT]: Authenticated session and a submitted donation
[POS]:    Examples - end-to-end wallet login and donation
[UPDATE]: When auth or payment flow changes
*/

use std::sync::Arc;

use scholarpay_core::*;

/// Example: sign in with a local key and donate
///
/// 1. Create HTTP client
/// 2. Install a wallet capability
/// 3. Authenticate through challenge/response
/// 4. Build, sign and submit a payment
///
/// Expects the platform API on http://127.0.0.1:8080 and the donor account
/// funded on the test network.
#[tokio::main]
async fn main() {
    println!("=== ScholarPay Donation Example ===\n");

    // Step 1: Create HTTP client
    let client = match PlatformClient::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("✓ HTTP client created");

    // Step 2: Install a wallet
    let keypair = StellarKeypair::generate();
    let donor = keypair.public_key();
    let slot = WalletSlot::with_wallet(Arc::new(LocalKeyWallet::new(keypair)));
    let key_proof = KeyProofClient::new(Arc::new(slot));
    println!("✓ Wallet installed for {}", donor);

    // Step 3: Authenticate
    let sessions = SessionManager::with_client(
        client.clone(),
        key_proof.clone(),
        Arc::new(MemorySessionStore::new()),
        Network::Testnet,
    );
    match sessions.authenticate().await {
        Ok(identity) => println!("✓ Authenticated as {:?}", identity.public_key()),
        Err(e) => {
            eprintln!("Authentication failed: {} ({})", e.user_message(), e);
            return;
        }
    }

    // Step 4: Donate
    let recipient = StellarKeypair::generate().public_key();
    let intent = PaymentIntent::new(donor.as_str(), recipient.as_str(), "10.5").with_memo("scholarship");
    let builder = PaymentTransactionBuilder::new(client.clone(), Network::Testnet);
    let envelope = match builder.build(&intent).await {
        Ok(envelope) => envelope,
        Err(e) => {
            eprintln!("Build failed: {} ({})", e.user_message(), e);
            return;
        }
    };
    println!("✓ Built transaction {}", envelope.hash);

    match PaymentSubmitter::new(client).submit(&envelope, &key_proof).await {
        SubmissionResult::Success { hash } => println!("✓ Donation accepted: {}", hash),
        SubmissionResult::Failure { kind, detail } => eprintln!("Donation failed [{}]: {}", kind, detail),
    }
}
