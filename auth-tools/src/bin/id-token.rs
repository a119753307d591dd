use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use auth_tools::{init_logging, interactive_login, rule, CognitoArgs};
use dungeon_shared::auth::decode_jwt_payload;

#[derive(Parser)]
#[command(name = "id-token")]
#[command(about = "Log in to the Cognito user pool and print the ID token for authorizer tests")]
struct Cli {
    #[command(flatten)]
    cognito: CognitoArgs,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    println!("🧪 IDトークン取得・表示ツール");
    println!("{}", rule('=', 60));

    let Some(tokens) = interactive_login(cli.cognito.into()).await? else {
        println!("❌ トークンの取得に失敗しました");
        return Ok(ExitCode::FAILURE);
    };

    println!("\n{}", rule('=', 80));
    println!("🎫 取得したトークン情報");
    println!("{}", rule('=', 80));

    if let Some(id_token) = tokens.id_token.as_deref() {
        println!("📋 ID Token (長さ: {} 文字):", id_token.chars().count());
        println!("{}", rule('─', 50));
        println!("{}", id_token);
        println!("{}", rule('─', 50));

        println!("\n📤 Authorization ヘッダー用:");
        println!("{}", rule('─', 50));
        println!("Bearer {}", id_token);
        println!("{}", rule('─', 50));
    }

    if let Some(access_token) = tokens.access_token.as_deref() {
        let preview: String = access_token.chars().take(100).collect();
        println!(
            "\n🔑 Access Token (長さ: {} 文字):",
            access_token.chars().count()
        );
        println!("{}", rule('─', 30));
        println!("{}...", preview);
        println!("{}", rule('─', 30));
    }

    let Some(id_token) = tokens.id_token else {
        println!("❌ IDトークンが取得できませんでした");
        return Ok(ExitCode::FAILURE);
    };

    match decode_jwt_payload(&id_token) {
        Ok(payload) => {
            println!("\n🔍 ID Token ペイロード:");
            println!("{}", rule('─', 30));
            println!("{}", serde_json::to_string_pretty(&payload)?);
            println!("{}", rule('─', 30));
        }
        Err(err) => println!("ペイロードデコードエラー: {}", err),
    }

    println!("\n{}", rule('=', 80));
    println!("📝 次の手順");
    println!("{}", rule('=', 80));
    println!("1. 上記の「ID Token」をコピーしてください");
    println!("2. AWS Console → API Gateway → Authorizers");
    println!("3. 使用中のAuthorizerをクリック → Test");
    println!("4. Authorization Token欄に以下を貼り付け:");
    println!("   Bearer {}", id_token);
    println!("5. Testボタンをクリック");

    Ok(ExitCode::SUCCESS)
}
