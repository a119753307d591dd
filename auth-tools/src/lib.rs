//! Command-line helpers for logging in to the game's Cognito user pool and
//! smoke-testing the deployed API.

use clap::Args;

pub mod cognito;
pub mod cors;
pub mod prompt;


use cognito::CognitoSettings;

/// Cognito app client settings shared by both binaries.
#[derive(Args, Debug, Clone)]
pub struct CognitoArgs {
    /// AWS region of the user pool
    #[arg(long, env = "AWS_REGION", default_value = "ap-northeast-1")]
    pub region: String,

    /// Cognito user pool id
    #[arg(long, env = "COGNITO_USER_POOL_ID")]
    pub user_pool_id: String,

    /// Cognito app client id
    #[arg(long, env = "COGNITO_CLIENT_ID")]
    pub client_id: String,

    /// App client secret, when the client has one
    #[arg(long, env = "COGNITO_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,
}

impl From<CognitoArgs> for CognitoSettings {
    fn from(args: CognitoArgs) -> Self {
        Self {
            region: args.region,
            user_pool_id: args.user_pool_id,
            client_id: args.client_id,
            client_secret: args.client_secret.filter(|secret| !secret.is_empty()),
        }
    }
}

/// Diagnostics go to stderr so stdout stays copy-pasteable.
pub fn init_logging() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "warn,auth_tools=info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

pub fn rule(ch: char, width: usize) -> String {
    ch.to_string().repeat(width)
}

/// Prompts for credentials and logs in, printing progress the way both tools
/// report it. `Ok(None)` means Cognito answered with an unsupported challenge
/// or rejected the login; the reason has already been printed.
pub async fn interactive_login(settings: CognitoSettings) -> anyhow::Result<Option<cognito::Tokens>> {
    println!("🌍 リージョン: {}", settings.region);
    println!("👥 User Pool: {}", settings.user_pool_id);
    println!("📱 Client ID: {}", settings.client_id);
    println!();

    let credentials = prompt::prompt_credentials()?;
    let authenticator = cognito::CognitoAuthenticator::new(settings).await;

    println!("🔐 Cognito認証中... (ユーザー: {})", credentials.username);
    match authenticator
        .login(&credentials.username, &credentials.password)
        .await
    {
        Ok(cognito::LoginOutcome::Authenticated(tokens)) => {
            println!("✅ Cognito認証成功!");
            println!("   アクセストークン有効期限: {}秒", tokens.expires_in);
            Ok(Some(tokens))
        }
        Ok(cognito::LoginOutcome::Challenge(challenge)) => {
            println!("⚠️  追加認証が必要: {}", challenge);
            println!("{}", cognito::challenge_hint(&challenge));
            Ok(None)
        }
        Err(err) => {
            println!("❌ {}", err);
            if let Some(hint) = err.hint() {
                println!("   → {}", hint);
            }
            Ok(None)
        }
    }
}
