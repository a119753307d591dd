use anyhow::{bail, Context, Result};
use std::io::{self, BufRead, Write};

pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Prompts for a username on `output` and reads one line from `input`.
pub fn read_username<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<String> {
    write!(output, "ユーザー名: ")?;
    output.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("ユーザー名を読み取れませんでした")?;

    let username = line.trim().to_string();
    if username.is_empty() {
        bail!("ユーザー名が入力されていません");
    }
    Ok(username)
}

/// Asks for a username on stdin and a password without echo.
pub fn prompt_credentials() -> Result<Credentials> {
    println!("🔑 Cognito認証情報を入力してください");
    println!("{}", "-".repeat(40));

    let username = read_username(&mut io::stdin().lock(), &mut io::stdout())?;
    let password =
        rpassword::prompt_password("パスワード: ").context("パスワードを読み取れませんでした")?;
    if password.is_empty() {
        bail!("パスワードが入力されていません");
    }

    Ok(Credentials { username, password })
}
