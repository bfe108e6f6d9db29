// Copyright (C) 2025-2026 The robinhood Developers
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::fmt::Result as FmtResult;

use async_trait::async_trait;

use tokio::io::stderr;
use tokio::io::stdin;
use tokio::io::AsyncBufReadExt as _;
use tokio::io::AsyncWriteExt as _;
use tokio::io::BufReader;

use crate::Error;


/// The channel through which a verification code was delivered.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Channel {
  /// The code was sent via text message.
  Sms,
  /// The code was sent via email.
  Email,
  /// The code is generated by an authenticator app.
  Authenticator,
}

impl Display for Channel {
  fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
    let name = match self {
      Self::Sms => "SMS",
      Self::Email => "email",
      Self::Authenticator => "authenticator",
    };
    fmt.write_str(name)
  }
}


/// A source of verification codes.
///
/// During login the API may challenge the user to provide a code sent
/// to them or generated by an authenticator app. Implementations of
/// this trait are asked for such codes.
#[async_trait]
pub trait ChallengeResponder: Debug + Send + Sync {
  /// Retrieve the code delivered via the given channel.
  async fn respond(&self, channel: Channel) -> Result<String, Error>;
}


/// A `ChallengeResponder` prompting the user on the terminal.
///
/// The prompt is written to standard error and the code is read from
/// standard input.
#[derive(Clone, Copy, Debug, Default)]
pub struct StdinResponder;

#[async_trait]
impl ChallengeResponder for StdinResponder {
  async fn respond(&self, channel: Channel) -> Result<String, Error> {
    let mut stderr = stderr();
    let prompt = format!("Enter the {channel} verification code sent to your device: ");
    let () = stderr.write_all(prompt.as_bytes()).await?;
    let () = stderr.flush().await?;

    let mut line = String::new();
    let _count = BufReader::new(stdin()).read_line(&mut line).await?;
    let code = line.trim();
    if code.is_empty() {
      return Err(Error::Str("no verification code provided".into()))
    }
    Ok(code.to_string())
  }
}


#[cfg(test)]
mod tests {
  use super::*;

  use std::sync::Mutex;

  use test_log::test;


  /// A responder handing out a list of codes in order.
  #[derive(Debug)]
  struct Scripted(Mutex<Vec<&'static str>>);

  #[async_trait]
  impl ChallengeResponder for Scripted {
    async fn respond(&self, _channel: Channel) -> Result<String, Error> {
      let mut codes = self.0.lock().unwrap();
      if codes.is_empty() {
        return Err(Error::Str("out of codes".into()))
      }
      Ok(codes.remove(0).to_string())
    }
  }


  /// Check that responders can be used as trait objects.
  #[test(tokio::test)]
  async fn dyn_responder() {
    let responder: Box<dyn ChallengeResponder> = Box::new(Scripted(Mutex::new(vec!["1", "2"])));
    assert_eq!(responder.respond(Channel::Sms).await.unwrap(), "1");
    assert_eq!(responder.respond(Channel::Email).await.unwrap(), "2");
    assert!(responder.respond(Channel::Sms).await.is_err());
  }

  /// Check the textual representation of channels used in prompts.
  #[test]
  fn channel_display() {
    assert_eq!(Channel::Sms.to_string(), "SMS");
    assert_eq!(Channel::Email.to_string(), "email");
    assert_eq!(Channel::Authenticator.to_string(), "authenticator");
  }
}
