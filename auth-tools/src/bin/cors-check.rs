use anyhow::Result;
use clap::Parser;
use reqwest::Method;
use std::process::ExitCode;

use auth_tools::cors::{passed_count, CorsProbe, DEFAULT_ORIGIN};
use auth_tools::{init_logging, interactive_login, rule, CognitoArgs};

#[derive(Parser)]
#[command(name = "cors-check")]
#[command(about = "Log in to Cognito, then smoke-test CORS and method handling of the API")]
struct Cli {
    #[command(flatten)]
    cognito: CognitoArgs,

    /// API base URL including the stage, e.g. https://abc.execute-api.ap-northeast-1.amazonaws.com/prod
    #[arg(long, env = "API_ENDPOINT")]
    endpoint: String,

    /// Origin header sent with every request
    #[arg(long, default_value = DEFAULT_ORIGIN)]
    origin: String,

    /// Method the endpoint is expected to reject with 405
    #[arg(long, default_value = "PATCH")]
    invalid_method: Method,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    println!("🧪 AWS Cognito認証 + Lambda API テスト");
    println!("{}", rule('=', 60));
    println!("🔗 API エンドポイント: {}", cli.endpoint);

    let Some(tokens) = interactive_login(cli.cognito.into()).await? else {
        println!("❌ 認証に失敗しました。処理を終了します。");
        return Ok(ExitCode::FAILURE);
    };
    let Some(id_token) = tokens.id_token else {
        println!("❌ IDトークンが取得できませんでした");
        return Ok(ExitCode::FAILURE);
    };
    println!(
        "🎫 IDトークンを取得しました (長さ: {} 文字)",
        id_token.chars().count()
    );

    println!("\n{}", rule('=', 60));
    println!("🚀 API接続テスト開始");
    println!("{}", rule('=', 60));

    let probe = CorsProbe::new(&cli.endpoint, Some(id_token))
        .with_origin(&cli.origin)
        .with_invalid_method(cli.invalid_method);
    let results = probe.run_all().await;

    for result in &results {
        println!("\n{}", rule('=', 60));
        println!("{}", result.name);
        println!("{}", rule('=', 60));
        for detail in &result.details {
            println!("  {}", detail);
        }
        if result.passed {
            println!("✅ {} テスト成功!", result.name);
        } else {
            println!("❌ {} テスト失敗", result.name);
        }
    }

    println!("\n{}", rule('=', 60));
    println!("📊 API テスト結果サマリー");
    println!("{}", rule('=', 60));
    for (index, result) in results.iter().enumerate() {
        let status = if result.passed { "✅ 成功" } else { "❌ 失敗" };
        println!("{}. {}: {}", index + 1, result.name, status);
    }

    let passed = passed_count(&results);
    println!("\n成功: {}/{}", passed, results.len());

    if passed == results.len() {
        println!("🎉 すべてのテストが成功しました!");
        Ok(ExitCode::SUCCESS)
    } else {
        println!("⚠️  いくつかのテストが失敗しました");
        Ok(ExitCode::FAILURE)
    }
}
