use crate::error_handling::types::CommandError;

pub const HELP: &str = "\
Commands:
  register <email> <password> <confirm-password> <name>
  login <email> <password>
  logout
  whoami
  list [genre]
  add-movie <title> <link> <genre>
  add-series <title> <link> <genre> <season> <episode>
  remove <id>
  trending
  add-trending <title> <link> <embed-id> [genre] [thumbnail-url]
  genres
  mode
  help
  quit
Quote arguments containing spaces: add-movie \"The Matrix\" https://example.com/matrix \"Science Fiction\"";

/// One line of shell input.
#[derive(Debug, PartialEq)]
pub enum Command {
    Register {
        email: String,
        password: String,
        confirm_password: String,
        name: String,
    },
    Login {
        email: String,
        password: String,
    },
    Logout,
    WhoAmI,
    List {
        genre: Option<String>,
    },
    AddMovie {
        title: String,
        link: String,
        genre: String,
    },
    AddSeries {
        title: String,
        link: String,
        genre: String,
        season: u32,
        episode: u32,
    },
    Remove {
        id: String,
    },
    Trending,
    AddTrending {
        title: String,
        link: String,
        embed_id: String,
        genre: Option<String>,
        thumbnail_url: Option<String>,
    },
    Genres,
    Mode,
    Help,
    Quit,
    Empty,
}

/// Splits on whitespace; double quotes group words and may be empty (`""`).
pub fn tokenize(line: &str) -> Result<Vec<String>, CommandError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quoted = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_token = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_token {
                    tokens.push(std::mem::take(&mut current));
                    in_token = false;
                }
            }
            c => {
                current.push(c);
                in_token = true;
            }
        }
    }
    if quoted {
        return Err(CommandError::UnterminatedQuote);
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}

fn number(value: &str) -> Result<u32, CommandError> {
    value
        .parse()
        .map_err(|_| CommandError::InvalidNumber(value.to_string()))
}

impl Command {
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let tokens = tokenize(line)?;
        let Some((name, args)) = tokens.split_first() else {
            return Ok(Command::Empty);
        };

        let command = match (name.as_str(), args) {
            ("register", [email, password, confirm_password, user_name]) => Command::Register {
                email: email.clone(),
                password: password.clone(),
                confirm_password: confirm_password.clone(),
                name: user_name.clone(),
            },
            ("register", _) => {
                return Err(CommandError::Usage(
                    "register <email> <password> <confirm-password> <name>",
                ))
            }
            ("login", [email, password]) => Command::Login {
                email: email.clone(),
                password: password.clone(),
            },
            ("login", _) => return Err(CommandError::Usage("login <email> <password>")),
            ("logout", []) => Command::Logout,
            ("whoami", []) => Command::WhoAmI,
            ("list", []) => Command::List { genre: None },
            ("list", [genre]) => Command::List {
                genre: Some(genre.clone()),
            },
            ("list", _) => return Err(CommandError::Usage("list [genre]")),
            ("add-movie", [title, link, genre]) => Command::AddMovie {
                title: title.clone(),
                link: link.clone(),
                genre: genre.clone(),
            },
            ("add-movie", _) => return Err(CommandError::Usage("add-movie <title> <link> <genre>")),
            ("add-series", [title, link, genre, season, episode]) => Command::AddSeries {
                title: title.clone(),
                link: link.clone(),
                genre: genre.clone(),
                season: number(season)?,
                episode: number(episode)?,
            },
            ("add-series", _) => {
                return Err(CommandError::Usage(
                    "add-series <title> <link> <genre> <season> <episode>",
                ))
            }
            ("remove", [id]) => Command::Remove { id: id.clone() },
            ("remove", _) => return Err(CommandError::Usage("remove <id>")),
            ("trending", []) => Command::Trending,
            ("add-trending", [title, link, embed_id, rest @ ..]) if rest.len() <= 2 => {
                Command::AddTrending {
                    title: title.clone(),
                    link: link.clone(),
                    embed_id: embed_id.clone(),
                    genre: rest.first().cloned(),
                    thumbnail_url: rest.get(1).cloned(),
                }
            }
            ("add-trending", _) => {
                return Err(CommandError::Usage(
                    "add-trending <title> <link> <embed-id> [genre] [thumbnail-url]",
                ))
            }
            ("genres", []) => Command::Genres,
            ("mode", []) => Command::Mode,
            ("help", _) => Command::Help,
            ("quit" | "exit", _) => Command::Quit,
            ("logout" | "whoami" | "trending" | "genres" | "mode", _) => {
                return Err(CommandError::Usage("command takes no arguments"))
            }
            (other, _) => return Err(CommandError::UnknownCommand(other.to_string())),
        };
        Ok(command)
    }
}
