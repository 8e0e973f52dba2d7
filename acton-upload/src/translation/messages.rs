//! Built-in message tables

pub(super) const EN: &[(&str, &str)] = &[
    // Transfer outcomes
    (
        "There is no error, the file uploaded with success",
        "There is no error, the file uploaded with success",
    ),
    (
        "The uploaded file exceeds the maximum upload size of the server",
        "The uploaded file exceeds the maximum upload size of the server",
    ),
    (
        "The uploaded file exceeds the MAX_FILE_SIZE directive that was specified in the HTML form",
        "The uploaded file exceeds the MAX_FILE_SIZE directive that was specified in the HTML form",
    ),
    (
        "The uploaded file was only partially uploaded",
        "The uploaded file was only partially uploaded",
    ),
    ("No file was uploaded", "No file was uploaded"),
    ("Missing a temporary folder", "Missing a temporary folder"),
    ("Failed to write file to disk", "Failed to write file to disk"),
    (
        "A server extension stopped the file upload",
        "A server extension stopped the file upload",
    ),
    // Input
    (
        "Cannot find uploaded file(s) identified by key: %s",
        "Cannot find uploaded file(s) identified by key: %s",
    ),
    (
        "Uploaded file lists for key %s have mismatched lengths",
        "Uploaded file lists for key %s have mismatched lengths",
    ),
    (
        "Unknown upload error code %s for key: %s",
        "Unknown upload error code %s for key: %s",
    ),
    ("Malformed upload form: %s", "Malformed upload form: %s"),
    ("Malformed multipart request: %s", "Malformed multipart request: %s"),
    ("Upload contains more than %s files", "Upload contains more than %s files"),
    ("I/O error: %s", "I/O error: %s"),
    // Validation
    ("File validation failed", "File validation failed"),
    ("Is not an uploaded file", "Is not an uploaded file"),
    (
        "Invalid file extension. Must be one of: %s",
        "Invalid file extension. Must be one of: %s",
    ),
    (
        "Invalid mimetype. Must be one of: %s",
        "Invalid mimetype. Must be one of: %s",
    ),
    (
        "File size is too small. Must be greater than or equal to: %s",
        "File size is too small. Must be greater than or equal to: %s",
    ),
    (
        "File size is too large. Must be less than or equal to: %s",
        "File size is too large. Must be less than or equal to: %s",
    ),
    ("Could not detect image size.", "Could not detect image size."),
    (
        "Image width(%spx) does not match required width(%spx)",
        "Image width(%spx) does not match required width(%spx)",
    ),
    (
        "Image height(%spx) does not match required height(%spx)",
        "Image height(%spx) does not match required height(%spx)",
    ),
    ("Could not read file: %s", "Could not read file: %s"),
    // Storage
    ("Directory does not exist", "Directory does not exist"),
    ("Directory is not writable", "Directory is not writable"),
    ("File name is empty", "File name is empty"),
    ("File already exists", "File already exists"),
    (
        "File could not be moved to final destination.",
        "File could not be moved to final destination.",
    ),
    ("Storage error: %s", "Storage error: %s"),
];

pub(super) const PT_BR: &[(&str, &str)] = &[
    (
        "There is no error, the file uploaded with success",
        "Não houve erro, o arquivo foi enviado com sucesso",
    ),
    (
        "The uploaded file exceeds the maximum upload size of the server",
        "O tamanho do arquivo enviado excede o tamanho máximo permitido pelo servidor",
    ),
    (
        "The uploaded file exceeds the MAX_FILE_SIZE directive that was specified in the HTML form",
        "O tamanho do arquivo enviado excede a diretiva MAX_FILE_SIZE especificada no formulário HTML",
    ),
    (
        "The uploaded file was only partially uploaded",
        "Arquivo parcialmente enviado",
    ),
    ("No file was uploaded", "Nenhum arquivo enviado"),
    ("Missing a temporary folder", "Nenhum diretório temporário encontrado"),
    ("Failed to write file to disk", "Falha ao gravar o arquivo em disco"),
    (
        "A server extension stopped the file upload",
        "Uma extensão do servidor parou o envio do arquivo",
    ),
    (
        "Cannot find uploaded file(s) identified by key: %s",
        "Não foi possível encontrar o(s) arquivo(s) enviado(s) com a chave: %s",
    ),
    (
        "Uploaded file lists for key %s have mismatched lengths",
        "As listas de arquivos enviados com a chave %s têm tamanhos diferentes",
    ),
    (
        "Unknown upload error code %s for key: %s",
        "Código de erro de envio desconhecido %s para a chave: %s",
    ),
    ("Malformed upload form: %s", "Formulário de envio malformado: %s"),
    (
        "Malformed multipart request: %s",
        "Requisição multipart malformada: %s",
    ),
    (
        "Upload contains more than %s files",
        "O envio contém mais de %s arquivos",
    ),
    ("I/O error: %s", "Erro de E/S: %s"),
    ("File validation failed", "Validação do arquivo falhou"),
    ("Is not an uploaded file", "Não é um arquivo enviado"),
    (
        "Invalid file extension. Must be one of: %s",
        "Extensão de arquivo inválida. Deve ser uma das: %s",
    ),
    (
        "Invalid mimetype. Must be one of: %s",
        "Mimetype inválido. Deve ser um dos: %s",
    ),
    (
        "File size is too small. Must be greater than or equal to: %s",
        "Tamanho do arquivo muito pequeno. Deve ser maior ou igual a: %s",
    ),
    (
        "File size is too large. Must be less than or equal to: %s",
        "Tamanho do arquivo muito grande. Deve ser menor ou igual a: %s",
    ),
    (
        "Could not detect image size.",
        "Não foi possível detectar o tamanho da imagem.",
    ),
    (
        "Image width(%spx) does not match required width(%spx)",
        "Largura da imagem (%spx) não corresponde à largura exigida (%spx)",
    ),
    (
        "Image height(%spx) does not match required height(%spx)",
        "Altura da imagem (%spx) não corresponde à altura exigida (%spx)",
    ),
    ("Could not read file: %s", "Não foi possível ler o arquivo: %s"),
    ("Directory does not exist", "Diretório não existe"),
    ("Directory is not writable", "Diretório sem permissão de escrita"),
    ("File name is empty", "Nome de arquivo vazio"),
    ("File already exists", "Arquivo já existe"),
    (
        "File could not be moved to final destination.",
        "Não foi possível mover o arquivo para o destino final.",
    ),
    ("Storage error: %s", "Erro de armazenamento: %s"),
];
